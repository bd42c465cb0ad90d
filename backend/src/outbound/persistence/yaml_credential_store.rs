//! YAML-backed credential store.

use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::Dir;

use super::{replace_file, run_blocking};
use crate::domain::ports::{CredentialMap, CredentialRepository, StorageError};

const CREDENTIALS_FILE: &str = "credentials.yml";
const STAGING_FILE: &str = "credentials.yml.tmp";

/// Credential store persisted as one YAML map of username to bcrypt hash.
pub struct YamlCredentialStore {
    root: Arc<Dir>,
}

impl YamlCredentialStore {
    /// Build the store over the opened data directory.
    pub fn new(root: Arc<Dir>) -> Self {
        Self { root }
    }

    /// Seed an empty credential file when none exists yet.
    ///
    /// Startup runs this once, so a later read failure means the store is
    /// genuinely broken rather than simply absent.
    pub fn initialize(&self) -> Result<(), StorageError> {
        if self.root.exists(CREDENTIALS_FILE) {
            return Ok(());
        }
        let yaml = serialize(&CredentialMap::new())?;
        self.root
            .write(CREDENTIALS_FILE, yaml.as_bytes())
            .map_err(|err| StorageError::io(format!("failed to seed {CREDENTIALS_FILE}: {err}")))
    }
}

#[async_trait]
impl CredentialRepository for YamlCredentialStore {
    async fn load(&self) -> Result<CredentialMap, StorageError> {
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            let raw = root.read_to_string(CREDENTIALS_FILE).map_err(|err| {
                StorageError::unavailable(format!("failed to read {CREDENTIALS_FILE}: {err}"))
            })?;
            serde_yaml::from_str(&raw).map_err(|err| {
                StorageError::unavailable(format!("failed to parse {CREDENTIALS_FILE}: {err}"))
            })
        })
        .await
    }

    async fn save(&self, credentials: &CredentialMap) -> Result<(), StorageError> {
        let yaml = serialize(credentials)?;
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            root.write(STAGING_FILE, yaml.as_bytes()).map_err(|err| {
                StorageError::io(format!("failed to stage {CREDENTIALS_FILE}: {err}"))
            })?;
            replace_file(&root, STAGING_FILE, CREDENTIALS_FILE).map_err(|err| {
                StorageError::io(format!("failed to replace {CREDENTIALS_FILE}: {err}"))
            })
        })
        .await
    }
}

fn serialize(credentials: &CredentialMap) -> Result<String, StorageError> {
    serde_yaml::to_string(credentials)
        .map_err(|err| StorageError::io(format!("failed to serialise {CREDENTIALS_FILE}: {err}")))
}
