//! Capture coordinator - per-URL decisions and the status polling loop
//!
//! Every input URL goes through the same state machine:
//!
//! ```text
//! unchecked ──► captured (a recent capture already exists)
//!           ──► pending  (a capture job was accepted) ──► captured | failed
//!           ──► failed   (the capture job was refused)
//! ```
//!
//! Only `pending` is left again; once a URL is captured or failed it stays
//! that way for the rest of the run, and any later status result for its job
//! is ignored.

use crate::capture::messages::describe_status_ext;
use crate::capture::transport::ArchiveTransport;
use crate::output::ProgressCounts;
use crate::state::{JobStatus, Progress};
use crate::CaptureError;
use chrono::Utc;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Timestamp recorded when a successful job doesn't report one
///
/// `/web/2/<url>` is the archive's alias for the newest capture, so links
/// built with it still resolve.
pub const LATEST_CAPTURE_TIMESTAMP: &str = "2";

/// Drives URLs from input to a captured or failed state
pub struct Coordinator<T> {
    transport: T,
    max_capture_age: i64,
    archive_base: String,
}

impl<T: ArchiveTransport> Coordinator<T> {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `transport` - The archive client
    /// * `max_capture_age` - Reuse existing captures at most this many days old
    /// * `archive_base` - Archive base URL used to build capture links
    pub fn new(transport: T, max_capture_age: u32, archive_base: impl Into<String>) -> Self {
        Self {
            transport,
            max_capture_age: i64::from(max_capture_age),
            archive_base: archive_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn archive_base(&self) -> &str {
        &self.archive_base
    }

    /// Processes every input URL, then polls until no job is pending
    ///
    /// Lines are trimmed of trailing whitespace; blank lines and lines that
    /// aren't UTF-8 are skipped. Only an I/O failure while reading the input
    /// ends the run early; archive problems end up in `progress.failed_urls`.
    pub async fn run<R>(&self, progress: &mut Progress, mut input: R) -> Result<(), CaptureError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut line_number = 0usize;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_number += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!("input line {} is not valid UTF-8; skipping", line_number);
                continue;
            };
            let url = line.trim_end();
            if url.is_empty() {
                continue;
            }
            self.process_input_url(url, progress).await;
        }

        self.poll_until_complete(progress).await;
        Ok(())
    }

    /// Decides what to do with one input URL
    ///
    /// 1. URLs this run already knows about are skipped
    /// 2. A capture at most `max_capture_age` days old is reused as is
    /// 3. Otherwise a capture job is submitted
    pub async fn process_input_url(&self, url: &str, progress: &mut Progress) {
        if progress.contains(url) {
            return;
        }

        info!("{}", url);

        match self.transport.resolve_last_capture(url).await {
            None => {
                info!(" - has not been captured");
            }
            Some(timestamp) => {
                let age = timestamp.age_days(Utc::now());
                info!(
                    " - was last captured {} day{} ago",
                    age,
                    if age == 1 { "" } else { "s" }
                );

                if age <= self.max_capture_age {
                    progress.record_captured(url, timestamp.as_str());
                    return;
                }
            }
        }

        self.submit(url, progress).await;
    }

    /// Submits a capture job and records the outcome
    async fn submit(&self, url: &str, progress: &mut Progress) {
        info!(" - submitting capture request");

        match self.transport.submit_capture(url).await {
            Some(mut request) => {
                info!(" - job id: {}", request.job_id);
                // Status results are matched through the job's url, which has to
                // be the pending key even if the archive normalized it.
                if request.url != url {
                    let echoed = std::mem::replace(&mut request.url, url.to_string());
                    request
                        .extra
                        .insert("archive_url".to_string(), Value::String(echoed));
                }
                progress.record_submitted(request);
            }
            None => {
                warn!(" - capture request failed");
                progress.record_failed(url);
            }
        }
    }

    /// Polls job status until every pending URL has a result
    ///
    /// There is no round limit: the loop ends when the archive has resolved
    /// every job. Pacing comes from the transport's rate limiter.
    pub async fn poll_until_complete(&self, progress: &mut Progress) {
        while !progress.is_complete() {
            let job_ids = progress.pending_job_ids();
            let results = self.transport.check_status_batch(&job_ids).await;

            for result in &results {
                self.process_result(result, progress);
            }

            info!("{}", ProgressCounts::from(&*progress));
        }
    }

    /// Applies one status result to the progress
    pub fn process_result(&self, result: &Value, progress: &mut Progress) {
        let Some(job_id) = result.get("job_id").and_then(Value::as_str) else {
            warn!("missing job ID in results; ignoring");
            return;
        };

        let Some(url) = progress.url_for_job(job_id).map(str::to_string) else {
            warn!("unknown job ID {} in results; ignoring", job_id);
            return;
        };

        if !progress.is_pending(&url) {
            info!("already-processed job ID {} in results; ignoring", job_id);
            return;
        }

        info!("{}", url);
        info!(" - job id: {}", job_id);

        let status = JobStatus::from_result(result);
        debug!(" - status: {}", status);

        match status {
            JobStatus::Pending => {
                info!(" - capture still pending");
            }
            JobStatus::Error => {
                warn!(" - capture failed");
                progress.record_failed(&url);
                log_error_details(result);
            }
            JobStatus::Success => {
                info!(" - capture succeeded");
                let timestamp = result
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .unwrap_or(LATEST_CAPTURE_TIMESTAMP);
                progress.record_captured(&url, timestamp);
            }
        }
    }
}

/// Logs the diagnostic fields of a failed job
fn log_error_details(result: &Value) {
    if let Some(code) = result.get("status_ext").and_then(Value::as_str) {
        warn!(" - {}", describe_status_ext(code));
    }
    if let Some(message) = result.get("message").and_then(Value::as_str) {
        warn!(" - {}", message);
    }
}
