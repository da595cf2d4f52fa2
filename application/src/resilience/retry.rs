//! Retry policy with pluggable backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use conclave_domain::BackoffStrategy;

/// How a failed operation is retried.
///
/// `max_retries` counts retries, not attempts: a policy with `max_retries: 2`
/// runs the operation at most three times.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub strategy: BackoffStrategy,
    pub base_delay: Duration,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base_delay: Duration::from_millis(200),
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new(strategy: BackoffStrategy, base_delay: Duration, max_retries: u32) -> Self {
        Self {
            strategy,
            base_delay,
            max_retries,
        }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            base_delay: Duration::ZERO,
            max_retries: 0,
        }
    }

    /// Run `op` until it succeeds or retries are exhausted.
    ///
    /// The delay before retry `n` (0-based) follows the strategy's law
    /// applied to `base_delay`. The last error is returned unchanged when
    /// the budget runs out.
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries => {
                    let delay = self.strategy.delay_for(attempt, self.base_delay);
                    warn!(
                        "attempt {}/{} failed: {}; retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(BackoffStrategy::Fixed, Duration::ZERO, max_retries)
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = instant_policy(3)
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(5) }
            })
            .await;
        assert_eq!(result.ok(), Some(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = instant_policy(3)
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.ok(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = instant_policy(2)
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("fail {n}")) }
            })
            .await;
        assert_eq!(result.err().as_deref(), Some("fail 2"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = RetryPolicy::none()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope".to_string()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
