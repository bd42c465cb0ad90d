//! YAML-backed per-user recipe collections.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::Dir;

use super::{replace_file, run_blocking};
use crate::domain::collection::RecipeCollection;
use crate::domain::ports::{RecipeRepository, StorageError};
use crate::domain::user::Username;

const RECIPES_DIR: &str = "recipes";

/// Recipe store holding one `recipes/<username>.yml` document per user.
///
/// A user's file appears on their first save; loading before that yields an
/// empty collection without touching the disk.
pub struct YamlRecipeStore {
    root: Arc<Dir>,
}

impl YamlRecipeStore {
    /// Build the store over the opened data directory.
    pub fn new(root: Arc<Dir>) -> Self {
        Self { root }
    }

    fn target(user: &Username) -> String {
        format!("{RECIPES_DIR}/{user}.yml")
    }

    fn staging(user: &Username) -> String {
        format!("{RECIPES_DIR}/{user}.yml.tmp")
    }
}

#[async_trait]
impl RecipeRepository for YamlRecipeStore {
    async fn load(&self, user: &Username) -> Result<RecipeCollection, StorageError> {
        let target = Self::target(user);
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            let raw = match root.read_to_string(&target) {
                Ok(raw) => raw,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    return Ok(RecipeCollection::new());
                }
                Err(err) => {
                    return Err(StorageError::unavailable(format!(
                        "failed to read {target}: {err}"
                    )));
                }
            };
            serde_yaml::from_str(&raw)
                .map_err(|err| StorageError::unavailable(format!("failed to parse {target}: {err}")))
        })
        .await
    }

    async fn save(
        &self,
        user: &Username,
        collection: &RecipeCollection,
    ) -> Result<(), StorageError> {
        let target = Self::target(user);
        let yaml = serde_yaml::to_string(collection)
            .map_err(|err| StorageError::io(format!("failed to serialise {target}: {err}")))?;
        let staging = Self::staging(user);
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            root.create_dir_all(RECIPES_DIR)
                .map_err(|err| StorageError::io(format!("failed to create {RECIPES_DIR}: {err}")))?;
            root.write(&staging, yaml.as_bytes())
                .map_err(|err| StorageError::io(format!("failed to stage {target}: {err}")))?;
            replace_file(&root, &staging, &target)
                .map_err(|err| StorageError::io(format!("failed to replace {target}: {err}")))
        })
        .await
    }
}
