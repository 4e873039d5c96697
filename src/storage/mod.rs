//! Storage module for persisting capture progress
//!
//! Progress is only written when a run is interrupted. The next run picks the
//! snapshot up, deletes it, and carries on with the jobs it describes. A run
//! that finishes normally leaves nothing behind.

mod json_file;
mod traits;

pub use json_file::JsonFileStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the snapshot store at the given path
///
/// # Arguments
///
/// * `path` - Path to the JSON snapshot file
pub fn open_store(path: &Path) -> JsonFileStore {
    JsonFileStore::new(path)
}
