//! Capture module for archiving URLs
//!
//! This module contains the core capture logic, including:
//! - Pacing every outbound request through one rate limiter
//! - The Save Page Now HTTP client
//! - Per-URL capture decisions and status polling
//! - Running, interrupting and resuming a whole capture run

mod client;
mod coordinator;
mod driver;
pub mod messages;
mod rate_limiter;
mod timestamp;
mod transport;

pub use client::{build_http_client, SpnClient};
pub use coordinator::{Coordinator, LATEST_CAPTURE_TIMESTAMP};
pub use driver::{run_capture, RunOutcome};
pub use rate_limiter::RateLimiter;
pub use timestamp::CaptureTimestamp;
pub use transport::ArchiveTransport;

use crate::config::Config;
use crate::CaptureError;

/// Builds a coordinator backed by the Save Page Now client
///
/// # Example
///
/// ```no_run
/// use wayback_capture::capture::{coordinator_from_config, run_capture};
/// use wayback_capture::config::load_config;
/// use wayback_capture::storage::JsonFileStore;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("capture.toml"))?;
/// let coordinator = coordinator_from_config(&config)?;
/// let store = JsonFileStore::new(&config.output.progress_path);
/// let input = tokio::io::BufReader::new(tokio::io::stdin());
/// let mut out = std::io::stdout();
/// run_capture(&coordinator, &store, input, std::future::pending(), &mut out).await?;
/// # Ok(())
/// # }
/// ```
pub fn coordinator_from_config(config: &Config) -> Result<Coordinator<SpnClient>, CaptureError> {
    let client = SpnClient::new(config)?;
    Ok(Coordinator::new(
        client,
        config.capture.max_capture_age,
        config.archive.base_url.clone(),
    ))
}
