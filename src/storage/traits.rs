//! Storage traits and error types
//!
//! This module defines the trait interface for progress snapshot backends and
//! associated error types.

use crate::state::Progress;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot {path} could not be decoded: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for progress snapshot backends
///
/// A snapshot is work owed by an earlier, interrupted run. Loading it hands
/// that work to the current run, so `load_or_init` consumes the snapshot.
pub trait ProgressStore {
    /// Loads and consumes a saved snapshot, or returns empty progress
    fn load_or_init(&self) -> StorageResult<Progress>;

    /// Replaces any saved snapshot with the given progress
    fn save(&self, progress: &Progress) -> StorageResult<()>;

    /// Reads a saved snapshot without consuming it
    fn peek(&self) -> StorageResult<Option<Progress>>;

    /// Removes any saved snapshot
    ///
    /// Returns true if there was one.
    fn discard(&self) -> StorageResult<bool>;
}
