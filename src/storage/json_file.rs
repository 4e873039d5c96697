//! JSON file snapshot backend

use crate::state::Progress;
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores the progress snapshot as a single JSON document
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`
    ///
    /// The file is not touched until the store is used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if a snapshot is waiting to be resumed
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads and decodes the snapshot, if there is one
    fn read(&self) -> StorageResult<Option<Progress>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let progress =
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(Some(progress))
    }

    /// Sibling path used to write the snapshot before renaming it into place
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressStore for JsonFileStore {
    fn load_or_init(&self) -> StorageResult<Progress> {
        match self.read()? {
            Some(progress) => {
                // A corrupt snapshot never gets here, so it stays on disk for inspection
                fs::remove_file(&self.path)?;
                tracing::info!(
                    "Resumed progress from {}: {} pending, {} captured, {} failed",
                    self.path.display(),
                    progress.pending_urls.len(),
                    progress.captured_urls.len(),
                    progress.failed_urls.len()
                );
                Ok(progress)
            }
            None => {
                tracing::debug!("No snapshot at {}, starting fresh", self.path.display());
                Ok(Progress::new())
            }
        }
    }

    fn save(&self, progress: &Progress) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(progress)?;
        let temp = self.temp_path();

        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        tracing::info!("Saved progress to {}", self.path.display());
        Ok(())
    }

    fn peek(&self) -> StorageResult<Option<Progress>> {
        self.read()
    }

    fn discard(&self) -> StorageResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Discarded snapshot {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
