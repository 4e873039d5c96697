//! Wayback-Capture: a rate-limited Save Page Now client
//!
//! This crate submits URLs to the Wayback Machine, tracks every capture job it
//! starts until the archive reports a result, and keeps enough state on disk to
//! resume an interrupted run without submitting the same URL twice.

pub mod capture;
pub mod config;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Wayback-Capture operations
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid location pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Wayback-Capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use capture::{run_capture, ArchiveTransport, Coordinator, RunOutcome, SpnClient};
pub use config::Config;
pub use state::{CaptureRequest, JobStatus, Progress};
pub use storage::{JsonFileStore, ProgressStore};
