//! The archive operations the coordinator depends on

use crate::capture::timestamp::CaptureTimestamp;
use crate::state::CaptureRequest;
use serde_json::Value;

/// Outbound calls to the archive
///
/// Implementations never fail outright: transport errors and unexpected
/// responses are logged and reported as `None` or an empty result, which the
/// coordinator folds into the run's progress.
#[allow(async_fn_in_trait)]
pub trait ArchiveTransport {
    /// Submits a capture job for `url`
    ///
    /// Returns the accepted job, or `None` if the archive didn't accept it.
    async fn submit_capture(&self, url: &str) -> Option<CaptureRequest>;

    /// Fetches status results for the given jobs
    ///
    /// Results come back in request order; jobs whose status couldn't be
    /// fetched are simply absent.
    async fn check_status_batch(&self, job_ids: &[String]) -> Vec<Value>;

    /// Finds the timestamp of the most recent capture of `url`
    ///
    /// Returns `None` if there is no capture or it couldn't be determined.
    async fn resolve_last_capture(&self, url: &str) -> Option<CaptureTimestamp>;
}
