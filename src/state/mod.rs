//! State module for tracking capture progress
//!
//! # Components
//!
//! - `JobStatus`: The status the archive reports for a capture job
//! - `CaptureRequest`: A job accepted by the save endpoint
//! - `Progress`: Everything a run knows about its URLs; the unit that is
//!   saved and restored across interrupted runs

mod job_status;
mod progress;

// Re-export main types
pub use job_status::JobStatus;
pub use progress::{CaptureRequest, Progress};
