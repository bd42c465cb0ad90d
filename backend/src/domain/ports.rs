//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters.
//! The services depend on these traits only; the cap-std backed adapters in
//! `outbound::persistence` provide the production implementations and tests
//! substitute in-memory stubs. Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use super::collection::RecipeCollection;
use super::user::Username;

/// Stored credentials, mapping each username to its bcrypt hash.
pub type CredentialMap = BTreeMap<Username, String>;

/// Failure raised by a storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing file or directory could not be read or parsed.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
    /// A write, copy, or removal failed at the filesystem.
    #[error("storage I/O failure: {message}")]
    Io { message: String },
}

impl StorageError {
    /// Helper for stores that cannot be opened or parsed.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for filesystem operations that failed part-way.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Persistence port for the credential store shared by every user.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Load the full credential map.
    async fn load(&self) -> Result<CredentialMap, StorageError>;

    /// Persist the full credential map.
    async fn save(&self, credentials: &CredentialMap) -> Result<(), StorageError>;
}

/// Persistence port for per-user recipe collections.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Load `user`'s collection. A user with no stored file has an empty
    /// collection; the file itself appears on first save.
    async fn load(&self, user: &Username) -> Result<RecipeCollection, StorageError>;

    /// Persist `user`'s collection, creating the file if necessary.
    async fn save(
        &self,
        user: &Username,
        collection: &RecipeCollection,
    ) -> Result<(), StorageError>;
}

/// Outcome of removing a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The file existed and is gone now.
    Removed,
    /// There was no such file to begin with.
    AlreadyAbsent,
}

/// Persistence port for uploaded recipe images, one directory per user.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Copy `source` into `user`'s image directory under `filename`,
    /// replacing any previous file of that name.
    async fn store(
        &self,
        user: &Username,
        filename: &str,
        source: &Path,
    ) -> Result<(), StorageError>;

    /// Read `filename` from `user`'s image directory; `None` when absent.
    async fn load(&self, user: &Username, filename: &str)
    -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove `filename` from `user`'s image directory. A file that is
    /// already gone is reported, not treated as a failure.
    async fn remove(
        &self,
        user: &Username,
        filename: &str,
    ) -> Result<RemoveOutcome, StorageError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{CredentialMap, CredentialRepository, StorageError};
    use crate::domain::user::Username;

    #[test]
    fn storage_errors_describe_their_failure() {
        let err = StorageError::unavailable("recipes/alice.yml is corrupt");
        assert_eq!(
            err.to_string(),
            "storage unavailable: recipes/alice.yml is corrupt"
        );

        let err = StorageError::io("copy interrupted");
        assert_eq!(err.to_string(), "storage I/O failure: copy interrupted");
    }

    #[derive(Default)]
    struct InMemoryCredentials {
        store: Mutex<CredentialMap>,
    }

    #[async_trait]
    impl CredentialRepository for InMemoryCredentials {
        async fn load(&self) -> Result<CredentialMap, StorageError> {
            let guard = self.store.lock().expect("store poisoned");
            Ok(guard.clone())
        }

        async fn save(&self, credentials: &CredentialMap) -> Result<(), StorageError> {
            let mut guard = self.store.lock().expect("store poisoned");
            *guard = credentials.clone();
            Ok(())
        }
    }

    #[tokio::test]
    async fn credential_round_trip() {
        let repo = InMemoryCredentials::default();
        let mut credentials = CredentialMap::new();
        let alice = Username::new("alice").expect("valid username");
        credentials.insert(alice.clone(), "$2b$12$fakehash".to_owned());

        repo.save(&credentials).await.expect("save succeeds");
        let loaded = repo.load().await.expect("load succeeds");
        assert_eq!(loaded.get(&alice), Some(&"$2b$12$fakehash".to_owned()));
    }
}
