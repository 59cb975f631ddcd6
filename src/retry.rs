//! Retry with linear backoff for transient network failures
//!
//! An explicit attempt loop, not recursion: predictable stack and
//! cancellation behavior. Only errors classified transient by
//! [`SessionError::is_transient`] are retried; a definitive rejection
//! (bad credentials, service error) propagates on the first attempt.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// Bounded linear-backoff retry policy.
///
/// Attempt `n` (zero-based) that fails transiently with `n < max_retries`
/// sleeps `base_delay * (n + 1)` before attempt `n + 1`. Delays are
/// non-decreasing by construction.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_retries, config.retry_base_delay)
    }

    /// Drive `op` to completion, retrying transient failures.
    ///
    /// `op` receives the zero-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.base_delay * (attempt + 1);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget_on_persistent_transient_failure() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        let calls = AtomicU32::new(0);

        let err = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(SessionError::Network("refused".into())) }
            })
            .await
            .unwrap_err();

        // max_retries + 1 total attempts
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_are_linear_and_non_decreasing() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        let start = tokio::time::Instant::now();

        let _ = policy
            .run(|_| async { Err::<(), _>(SessionError::Timeout) })
            .await;

        // 1000ms after attempt 0, 2000ms after attempt 1
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_not_retried() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        let calls = AtomicU32::new(0);

        let err = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(SessionError::InvalidCredentials) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err, SessionError::InvalidCredentials);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));

        let value = policy
            .run(|attempt| async move {
                if attempt < 2 {
                    Err(SessionError::Network("flaky".into()))
                } else {
                    Ok(attempt)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
    }
}
