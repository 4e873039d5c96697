//! Output module for run results
//!
//! This module handles:
//! - Writing capture links for every captured URL once a run completes
//! - Listing the URLs that could not be captured
//! - Summarizing progress counts

pub mod stats;

pub use stats::{print_statistics, ProgressCounts};

use crate::state::Progress;
use std::io::{self, Write};

/// Builds the archive link for a capture
pub fn capture_link(archive_base: &str, timestamp: &str, url: &str) -> String {
    format!("{}/web/{}/{}", archive_base, timestamp, url)
}

/// Writes one capture link per captured URL, ordered by URL
///
/// # Returns
///
/// The number of links written
pub fn write_captured<W: Write>(
    progress: &Progress,
    archive_base: &str,
    out: &mut W,
) -> io::Result<usize> {
    // captured_urls is a BTreeMap, so this is already URL order
    for (url, timestamp) in &progress.captured_urls {
        writeln!(out, "{}", capture_link(archive_base, timestamp, url))?;
    }
    out.flush()?;
    Ok(progress.captured_urls.len())
}

/// Logs the URLs that could not be captured, ordered by URL
pub fn log_failed(progress: &Progress) {
    if progress.failed_urls.is_empty() {
        return;
    }

    tracing::warn!("capturing the following URLs failed:");
    for url in &progress.failed_urls {
        tracing::warn!("{}", url);
    }
}
