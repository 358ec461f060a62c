//! Explicit retry policy for remote calls.
//!
//! The backing store throttles aggressively, so every remote call site
//! in the gateway is wrapped in a [`RetryPolicy`]: up to `max_attempts`
//! tries with exponential backoff (`base_delay × 2^attempt`), applied
//! only to rate-limit-class errors. Everything else propagates
//! immediately; retrying an auth failure or a missing collection just
//! burns quota.

use core::future::Future;
use core::time::Duration;

use crate::error::Result;

/// Default number of attempts before giving up.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base backoff delay.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry policy applied around each remote call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    max_attempts: u32,
    /// Backoff for attempt `n` is `base_delay × 2^n`.
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with explicit attempt and delay settings.
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Backoff delay before re-running attempt `attempt + 1`.
    #[inline]
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Runs `op`, retrying rate-limit-class failures with backoff.
    ///
    /// # Errors
    ///
    /// Returns the last error once attempts are exhausted, or the first
    /// non-retryable error immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0_u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts || !err.is_rate_limit() {
                        return Err(err);
                    }
                    let delay = self.backoff(attempt - 1);
                    tracing::debug!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "rate limited; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::FairPosError;

    /// Policy with no sleeping so the tests run instantly.
    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    /// A rate-limit-class error.
    fn throttled() -> FairPosError {
        FairPosError::Api {
            status: 429,
            message: "too many requests".to_owned(),
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn succeeds_after_transient_throttling() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = fast_policy()
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(throttled())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = fast_policy()
            .run(|| {
                let _n = calls.fetch_add(1, Ordering::SeqCst);
                async { Err(throttled()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = fast_policy()
            .run(|| {
                let _n = calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(FairPosError::Api {
                        status: 403,
                        message: "forbidden".to_owned(),
                    })
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_success_needs_no_retry() {
        let result: Result<&str> = fast_policy().run(|| async { Ok("ok") }).await;
        assert_eq!(result.unwrap(), "ok");
    }
}
