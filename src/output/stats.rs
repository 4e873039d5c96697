//! Progress counts for round summaries and `--stats`

use crate::state::Progress;
use std::fmt;

/// How many URLs are in each state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressCounts {
    pub captured: usize,
    pub failed: usize,
    pub pending: usize,
}

impl ProgressCounts {
    /// Total number of URLs the run has seen
    pub fn total(&self) -> usize {
        self.captured + self.failed + self.pending
    }
}

impl From<&Progress> for ProgressCounts {
    fn from(progress: &Progress) -> Self {
        Self {
            captured: progress.captured_urls.len(),
            failed: progress.failed_urls.len(),
            pending: progress.pending_urls.len(),
        }
    }
}

impl fmt::Display for ProgressCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} captured, {} failed, {} pending",
            self.captured, self.failed, self.pending
        )
    }
}

/// Prints a saved snapshot's contents to stdout
///
/// # Arguments
///
/// * `progress` - The snapshot to describe
pub fn print_statistics(progress: &Progress) {
    let counts = ProgressCounts::from(progress);

    println!("=== Saved Progress ===\n");
    println!("  URLs seen: {}", counts.total());
    println!("  Captured: {}", counts.captured);
    println!("  Failed: {}", counts.failed);
    println!("  Pending: {}", counts.pending);
    println!("  Jobs submitted: {}", progress.capture_requests.len());

    if !progress.pending_urls.is_empty() {
        println!("\nPending ({}):", progress.pending_urls.len());
        for (url, job_id) in &progress.pending_urls {
            println!("  - {} (job {})", url, job_id);
        }
    }

    if !progress.failed_urls.is_empty() {
        println!("\nFailed ({}):", progress.failed_urls.len());
        for url in &progress.failed_urls {
            println!("  - {}", url);
        }
    }
}
