//! Minimum-interval rate limiter for a single upstream credential.
//!
//! The upstream enforces per-key pacing, so each credential gets one
//! limiter instance that spaces outbound requests by at least a fixed
//! interval, measured at issue time.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Default spacing between outbound requests.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Paces requests so that consecutive issue times through one instance
/// differ by at least the configured minimum interval.
#[derive(Debug)]
pub struct RateLimiter {
    /// Issue time of the most recent request, if any.
    last_issue: Mutex<Option<Instant>>,
    /// Minimum spacing between issue times.
    min_interval: Duration,
}

impl RateLimiter {
    /// Create a limiter with the default one-second spacing.
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_MIN_INTERVAL)
    }

    /// Create a limiter with a custom spacing.
    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            last_issue: Mutex::new(None),
            min_interval,
        }
    }

    /// Lock the issue-time mutex, recovering from poison if necessary.
    ///
    /// The worst case after recovery is one request issued slightly early,
    /// which is better than panicking.
    fn lock_last_issue(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_issue.lock().unwrap_or_else(|poisoned| {
            warn!("rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Wait until a request may be issued, then record the issue time.
    ///
    /// If less than the minimum interval has elapsed since the previous
    /// issue, the caller is suspended for the remainder. The new issue time
    /// is recorded unconditionally, even when no wait was needed. The lock
    /// is never held across the sleep; the elapsed check is re-run after
    /// waking so concurrent callers stay correctly spaced.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut last = self.lock_last_issue();
                let now = Instant::now();
                match *last {
                    Some(prev) => {
                        let elapsed = now.duration_since(prev);
                        if elapsed >= self.min_interval {
                            *last = Some(now);
                            return;
                        }
                        self.min_interval - elapsed
                    }
                    None => {
                        *last = Some(now);
                        return;
                    }
                }
            };

            debug!("rate limiter: waiting {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
