use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use std::fmt;

/// Format of archive timestamps, e.g. `20240101093000`
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// A validated archive capture timestamp
///
/// Keeps the original text so links are rebuilt exactly as the archive
/// wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTimestamp {
    raw: String,
    at: NaiveDateTime,
}

impl CaptureTimestamp {
    /// Parses a `YYYYMMDDHHMMSS` timestamp (UTC)
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 14 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let at = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            raw: raw.to_string(),
            at,
        })
    }

    /// Builds a timestamp for a point in time
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let at = at.naive_utc().trunc_subsecs(0);
        Self {
            raw: at.format(TIMESTAMP_FORMAT).to_string(),
            at,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whole days between the capture and `now`, rounded down
    ///
    /// A capture stamped in the future has a negative age.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = now.naive_utc() - self.at;
        elapsed.num_seconds().div_euclid(SECONDS_PER_DAY)
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
