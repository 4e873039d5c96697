//! Configuration module for Wayback-Capture
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Everything except the credentials has a default, so the smallest useful file is:
//!
//! ```toml
//! [credentials]
//! access-key = "..."
//! secret-key = "..."
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wayback_capture::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("capture.toml")).unwrap();
//! println!("One request every {}s", config.capture.period_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiveConfig, CaptureConfig, Config, CredentialsConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
