//! Bounded exponential-backoff retry for async operations.
//!
//! Every external-service call in the workspace (directory reads, auth
//! lookups, notification persistence) goes through [`retry`] so that a
//! transient failure does not surface to the caller on the first attempt.
//!
//! The policy is deliberately simple: `base * 2^(attempt-1)` between
//! attempts, no jitter, no circuit breaking, no cancellation. The wrapper
//! does not distinguish retryable from non-retryable errors, so a permanent
//! failure pays the full backoff cost before it is propagated unmodified.
//!
//! # Usage
//!
//! ```rust,ignore
//! use backoff::{retry, RetryPolicy};
//!
//! let policy = RetryPolicy::default(); // 3 attempts, 1s base delay
//! let record = retry(&policy, || store.user_by_id(&id)).await?;
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry policy: attempt count and base delay for exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A policy that never retries. Useful in tests.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after a failed attempt (1-based): `base * 2^(attempt-1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted.
///
/// The last failure is propagated unmodified. Each failed attempt is logged
/// at `warn!` with the delay before the next one.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// An operation that fails the first `failures` calls, then succeeds
    /// with the 1-based call number.
    fn flaky(
        failures: u32,
    ) -> (
        Arc<AtomicU32>,
        impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<u32, String>> + Send>>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let op = move || {
            let counter = counter.clone();
            Box::pin(async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    Err(format!("transient failure {n}"))
                } else {
                    Ok(n + 1)
                }
            }) as std::pin::Pin<Box<dyn Future<Output = _> + Send>>
        };
        (calls, op)
    }

    #[tokio::test]
    async fn succeeds_first_try_without_sleeping() {
        let (calls, op) = flaky(0);
        let result = retry(&RetryPolicy::default(), op).await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_doubling_delays() {
        let (calls, op) = flaky(2);
        let start = Instant::now();
        let result = retry(&RetryPolicy::default(), op).await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn propagates_last_error_after_final_attempt() {
        let (calls, op) = flaky(10);
        let result = retry(&RetryPolicy::default(), op).await;
        assert_eq!(result, Err("transient failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn no_retry_policy_makes_single_attempt() {
        let (calls, op) = flaky(1);
        let result = retry(&RetryPolicy::no_retry(), op).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }
}
