//! Flat-file persistence for credentials, recipes, and images.
//!
//! # Architecture
//!
//! - **Thin adapters**: each store only translates between domain types and
//!   the on-disk layout. No business logic resides here.
//! - **Capability-scoped I/O**: every store works through a [`Dir`] handle
//!   opened once at startup, so no code path can address anything outside
//!   the data directory.
//! - **Stage-then-rename writes**: replacing a document stages a sibling
//!   temp file first and renames it into place, leaving either the old
//!   document or the new one on disk after a crash, never a half-written
//!   mix.
//! - **Off-worker I/O**: the adapters run their reads and writes on the
//!   blocking thread pool, so a slow disk never stalls a request worker.
//!
//! Layout under the data directory:
//!
//! ```text
//! credentials.yml
//! recipes/<username>.yml
//! images/<username>/<recipe id>.<ext>
//! ```

use std::io;
use std::path::Path;

use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::domain::ports::StorageError;

mod fs_image_store;
mod yaml_credential_store;
mod yaml_recipe_store;

pub use fs_image_store::FsImageStore;
pub use yaml_credential_store::YamlCredentialStore;
pub use yaml_recipe_store::YamlRecipeStore;

/// Open the data directory all stores live under, creating it if needed.
pub fn open_data_dir(path: &Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(path, ambient_authority())?;
    Dir::open_ambient_dir(path, ambient_authority())
}

/// Replace `target` with the already-written `staged` sibling.
pub(crate) fn replace_file(dir: &Dir, staged: &str, target: &str) -> io::Result<()> {
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    dir.rename(staged, dir, target)
}

/// Run `task` on the blocking thread pool and wait for its result.
///
/// The adapters call this with the file work they would otherwise do
/// inline, the same arrangement the account service uses for password
/// hashing.
pub(crate) async fn run_blocking<T>(
    task: impl FnOnce() -> Result<T, StorageError> + Send + 'static,
) -> Result<T, StorageError>
where
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| StorageError::io(format!("storage task failed: {err}")))?
}
