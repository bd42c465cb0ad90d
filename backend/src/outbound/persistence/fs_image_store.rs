//! Filesystem store for uploaded recipe images.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::Dir;

use super::{replace_file, run_blocking};
use crate::domain::ports::{ImageRepository, RemoveOutcome, StorageError};
use crate::domain::user::Username;

const IMAGES_DIR: &str = "images";

/// Image store keeping each user's uploads under `images/<username>/`.
///
/// Uploads arrive as spooled temporary files which may live on a different
/// filesystem, so `store` copies the bytes in rather than renaming the
/// source.
pub struct FsImageStore {
    root: Arc<Dir>,
}

impl FsImageStore {
    /// Build the store over the opened data directory.
    pub fn new(root: Arc<Dir>) -> Self {
        Self { root }
    }

    fn user_dir(user: &Username) -> String {
        format!("{IMAGES_DIR}/{user}")
    }
}

#[async_trait]
impl ImageRepository for FsImageStore {
    async fn store(
        &self,
        user: &Username,
        filename: &str,
        source: &Path,
    ) -> Result<(), StorageError> {
        let dir = Self::user_dir(user);
        let target = format!("{dir}/{filename}");
        let staging = format!("{target}.tmp");
        let source = source.to_path_buf();
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            root.create_dir_all(&dir)
                .map_err(|err| StorageError::io(format!("failed to create {dir}: {err}")))?;
            let bytes = std::fs::read(&source)
                .map_err(|err| StorageError::io(format!("failed to read spooled upload: {err}")))?;
            root.write(&staging, &bytes)
                .map_err(|err| StorageError::io(format!("failed to stage {target}: {err}")))?;
            replace_file(&root, &staging, &target)
                .map_err(|err| StorageError::io(format!("failed to replace {target}: {err}")))
        })
        .await
    }

    async fn load(&self, user: &Username, filename: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let target = format!("{}/{filename}", Self::user_dir(user));
        let root = Arc::clone(&self.root);
        run_blocking(move || match root.read(&target) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::io(format!("failed to read {target}: {err}"))),
        })
        .await
    }

    async fn remove(&self, user: &Username, filename: &str) -> Result<RemoveOutcome, StorageError> {
        let target = format!("{}/{filename}", Self::user_dir(user));
        let root = Arc::clone(&self.root);
        run_blocking(move || match root.remove_file(&target) {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(RemoveOutcome::AlreadyAbsent),
            Err(err) => Err(StorageError::io(format!("failed to remove {target}: {err}"))),
        })
        .await
    }
}
