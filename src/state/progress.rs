use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A capture job accepted by the archive
///
/// Anything else the save endpoint returned alongside `job_id` and `url` is
/// kept in `extra` and written back out with the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub job_id: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CaptureRequest {
    /// Builds a request from a decoded save response
    ///
    /// Returns `None` unless the response is an object with string `job_id`
    /// and `url` fields.
    pub fn from_response(response: Value) -> Option<Self> {
        let Value::Object(mut fields) = response else {
            return None;
        };

        let job_id = match fields.remove("job_id")? {
            Value::String(s) => s,
            _ => return None,
        };
        let url = match fields.remove("url")? {
            Value::String(s) => s,
            _ => return None,
        };

        Some(Self {
            job_id,
            url,
            extra: fields,
        })
    }
}

/// The full state of a capture run
///
/// Every URL the run has seen lives in exactly one of `pending_urls`,
/// `captured_urls` and `failed_urls`. Jobs are never removed from
/// `capture_requests` so late status results can still be traced to a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Accepted jobs by job id
    pub capture_requests: BTreeMap<String, CaptureRequest>,

    /// URLs waiting for a job result, in submission order
    #[serde(rename = "pending_job_ids")]
    pub pending_urls: IndexMap<String, String>,

    /// Archive timestamp of each captured URL
    pub captured_urls: BTreeMap<String, String>,

    pub failed_urls: BTreeSet<String>,
}

impl Progress {
    /// Creates an empty progress value
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL has already been seen by this run
    pub fn contains(&self, url: &str) -> bool {
        self.pending_urls.contains_key(url)
            || self.captured_urls.contains_key(url)
            || self.failed_urls.contains(url)
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending_urls.contains_key(url)
    }

    /// Returns true once no job is waiting for a result
    pub fn is_complete(&self) -> bool {
        self.pending_urls.is_empty()
    }

    /// Job ids still waiting for a result, in submission order
    pub fn pending_job_ids(&self) -> Vec<String> {
        self.pending_urls.values().cloned().collect()
    }

    /// Finds the URL a job was submitted for
    pub fn url_for_job(&self, job_id: &str) -> Option<&str> {
        self.capture_requests
            .get(job_id)
            .map(|request| request.url.as_str())
    }

    /// Records an accepted capture job and marks its URL pending
    pub fn record_submitted(&mut self, request: CaptureRequest) {
        self.pending_urls
            .insert(request.url.clone(), request.job_id.clone());
        self.capture_requests
            .insert(request.job_id.clone(), request);
    }

    /// Marks a URL as captured at the given archive timestamp
    pub fn record_captured(&mut self, url: &str, timestamp: &str) {
        self.pending_urls.shift_remove(url);
        self.captured_urls
            .insert(url.to_string(), timestamp.to_string());
    }

    /// Marks a URL as failed
    pub fn record_failed(&mut self, url: &str) {
        self.pending_urls.shift_remove(url);
        self.failed_urls.insert(url.to_string());
    }
}
