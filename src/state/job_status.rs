//! Status definitions for capture jobs reported by the archive
//!
//! The archive answers status requests with free-form strings. Only three of
//! them are meaningful; everything else is treated as a failed job.

use serde_json::Value;
use std::fmt;

/// The state of a submitted capture job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// The archive is still working on the capture
    Pending,

    /// The capture failed, or the archive reported something we don't understand
    Error,

    /// The capture completed and has a timestamp
    Success,
}

impl JobStatus {
    /// Converts the status to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Error => "error",
            Self::Success => "success",
        }
    }

    /// Parses a status string
    ///
    /// Unknown values become `Error` so that a new server-side state can never
    /// leave a job silently pending or mark it captured.
    pub fn from_status_str(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Error,
        }
    }

    /// Reads the `status` field of a status result
    ///
    /// A missing or non-string field is an `Error`.
    pub fn from_result(result: &Value) -> Self {
        result
            .get("status")
            .and_then(Value::as_str)
            .map(Self::from_status_str)
            .unwrap_or(Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
