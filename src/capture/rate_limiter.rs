//! Process-wide outbound request pacing
//!
//! The archive allows one request per period for a given account, across every
//! endpoint. [`RateLimiter`] enforces that with a single "last call" instant
//! behind an async mutex: a caller holds the lock while it waits, so calls are
//! released one at a time and never closer together than the period.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Allows at most one call start per `period`
#[derive(Debug)]
pub struct RateLimiter {
    period: Duration,

    /// Start of the most recent call. `None` until the first call, which is
    /// never delayed.
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum spacing between calls
    ///
    /// A zero period disables waiting.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_call: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits until the next call may start, then claims the slot
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let ready_at = previous + self.period;
            let now = Instant::now();
            if ready_at > now {
                debug!("rate limited, waiting {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}
