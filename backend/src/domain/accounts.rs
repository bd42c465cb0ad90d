//! Account registration and sign-in checks.

use std::sync::Arc;

use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::domain::error::DomainError;
use crate::domain::ports::{CredentialRepository, StorageError};
use crate::domain::user::Username;

/// Well-formed hash that matches no account; burned on unknown-user sign-ins
/// so they cost roughly the same as a real verification.
const DUMMY_HASH: &str = "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Registration and credential verification over the credential store.
///
/// Passwords are hashed with bcrypt on the blocking thread pool; only the
/// resulting hash ever reaches the repository. Registrations serialise on an
/// internal lock so two simultaneous claims of the same username cannot both
/// pass the existence check.
pub struct AccountService {
    credentials: Arc<dyn CredentialRepository>,
    registration: Mutex<()>,
}

impl AccountService {
    /// Build the service over a credential repository.
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self {
            credentials,
            registration: Mutex::new(()),
        }
    }

    /// Create an account for `username`.
    ///
    /// # Errors
    /// - [`DomainError::username_taken`] when the name is already registered.
    /// - Storage failures surface as [`DomainError::storage_unavailable`].
    pub async fn register(&self, username: &Username, password: &str) -> Result<(), DomainError> {
        let _guard = self.registration.lock().await;
        let mut credentials = self.credentials.load().await.map_err(map_storage_error)?;
        if credentials.contains_key(username) {
            return Err(DomainError::username_taken());
        }
        let hash = hash_password(password).await?;
        credentials.insert(username.clone(), hash);
        self.credentials
            .save(&credentials)
            .await
            .map_err(map_storage_error)
    }

    /// Check a sign-in attempt against the stored credentials.
    ///
    /// Unknown usernames and wrong passwords produce the identical error, so
    /// a response never betrays which half was wrong.
    ///
    /// # Errors
    /// - [`DomainError::invalid_credentials`] when the pair does not match.
    /// - Storage failures surface as [`DomainError::storage_unavailable`].
    pub async fn verify(&self, username: &Username, password: &str) -> Result<(), DomainError> {
        let credentials = self.credentials.load().await.map_err(map_storage_error)?;
        let Some(stored) = credentials.get(username).cloned() else {
            let _burned = verify_password(password, DUMMY_HASH.to_owned()).await;
            return Err(DomainError::invalid_credentials());
        };
        if verify_password(password, stored).await? {
            Ok(())
        } else {
            Err(DomainError::invalid_credentials())
        }
    }
}

async fn hash_password(password: &str) -> Result<String, DomainError> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || bcrypt::hash(password.as_str(), bcrypt::DEFAULT_COST))
        .await
        .map_err(|err| DomainError::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| DomainError::internal(format!("password hashing failed: {err}")))
}

async fn verify_password(password: &str, hash: String) -> Result<bool, DomainError> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || bcrypt::verify(password.as_str(), &hash))
        .await
        .map_err(|err| DomainError::internal(format!("password verification task failed: {err}")))?
        .map_err(|err| DomainError::internal(format!("password verification failed: {err}")))
}

fn map_storage_error(err: StorageError) -> DomainError {
    DomainError::storage_unavailable(err.to_string())
}
