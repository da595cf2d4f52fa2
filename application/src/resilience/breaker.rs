//! Circuit breaker wrapping a domain state machine with async call plumbing.

use std::future::Future;
use std::sync::Mutex;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use conclave_domain::{BreakerCore, BreakerSettings, BreakerSnapshot, BreakerState};

/// Error returned by guarded calls.
#[derive(Error, Debug)]
pub enum CircuitError<E: std::error::Error> {
    #[error("Circuit open for {0}")]
    Open(String),

    #[error(transparent)]
    Inner(E),
}

impl<E: std::error::Error> CircuitError<E> {
    /// Check if the call was rejected by the gate rather than failing inside.
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitError::Open(_))
    }
}

/// A named circuit breaker guarding calls to one responder.
///
/// The transition rules live in [`BreakerCore`]; this type adds the lock and
/// the async call protocol around them. The lock is never held across an
/// await point.
pub struct CircuitBreaker {
    name: String,
    core: Mutex<BreakerCore>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
        Self {
            name: name.into(),
            core: Mutex::new(BreakerCore::new(settings)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> BreakerState {
        self.lock_core().state()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        self.lock_core().snapshot()
    }

    /// Gate check. May flip Open -> HalfOpen when the open timeout elapsed.
    pub fn should_attempt(&self) -> bool {
        self.lock_core().should_attempt(Instant::now())
    }

    pub fn record_success(&self) {
        self.lock_core().record_success();
    }

    pub fn record_failure(&self) {
        self.lock_core().record_failure(Instant::now());
    }

    /// Run `op` through the breaker.
    ///
    /// Rejected immediately with [`CircuitError::Open`] when the gate is
    /// closed to traffic; otherwise the outcome of `op` is recorded and
    /// propagated.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, CircuitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        if !self.should_attempt() {
            debug!("circuit {} is open, rejecting call", self.name);
            return Err(CircuitError::Open(self.name.clone()));
        }

        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitError::Inner(e))
            }
        }
    }

    /// Run `op` through the breaker, falling back to `fallback` on any
    /// failure (including gate rejection).
    ///
    /// The fallback runs outside the breaker and does not touch its counters.
    /// If the fallback fails too, its error is the one surfaced.
    pub async fn call_with_fallback<F, Fut, FB, FutB, T, E>(
        &self,
        op: F,
        fallback: FB,
    ) -> Result<T, CircuitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce() -> FutB,
        FutB: Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        match self.call(op).await {
            Ok(value) => Ok(value),
            Err(primary) => {
                warn!(
                    "call through circuit {} failed ({}), trying fallback",
                    self.name, primary
                );
                fallback().await.map_err(CircuitError::Inner)
            }
        }
    }

    fn lock_core(&self) -> std::sync::MutexGuard<'_, BreakerCore> {
        match self.core.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_settings() -> BreakerSettings {
        BreakerSettings {
            failure_threshold: 2,
            success_threshold: 1,
            open_timeout: Duration::from_millis(20),
        }
    }

    #[derive(Error, Debug)]
    #[error("boom")]
    struct Boom;

    #[tokio::test]
    async fn test_call_success_passes_through() {
        let breaker = CircuitBreaker::new("test", test_settings());
        let result: Result<u32, CircuitError<Boom>> = breaker.call(|| async { Ok(42) }).await;
        assert_eq!(result.ok(), Some(42));
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_failures_open_the_circuit() {
        let breaker = CircuitBreaker::new("test", test_settings());
        for _ in 0..2 {
            let result: Result<u32, CircuitError<Boom>> =
                breaker.call(|| async { Err(Boom) }).await;
            assert!(matches!(result, Err(CircuitError::Inner(_))));
        }
        assert_eq!(breaker.state(), BreakerState::Open);

        // Next call is rejected without running the operation.
        let result: Result<u32, CircuitError<Boom>> =
            breaker.call(|| async { Ok(1) }).await;
        assert!(matches!(result, Err(CircuitError::Open(_))));
    }

    #[tokio::test]
    async fn test_half_open_after_timeout_then_recovery() {
        let breaker = CircuitBreaker::new("test", test_settings());
        for _ in 0..2 {
            let _: Result<u32, CircuitError<Boom>> = breaker.call(|| async { Err(Boom) }).await;
        }
        assert_eq!(breaker.state(), BreakerState::Open);

        tokio::time::sleep(Duration::from_millis(30)).await;

        // First probe after the timeout is admitted and its success closes
        // the circuit (success_threshold = 1).
        let result: Result<u32, CircuitError<Boom>> = breaker.call(|| async { Ok(7) }).await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_fallback_used_when_open() {
        let breaker = CircuitBreaker::new("test", test_settings());
        for _ in 0..2 {
            let _: Result<u32, CircuitError<Boom>> = breaker.call(|| async { Err(Boom) }).await;
        }

        let result: Result<u32, CircuitError<Boom>> = breaker
            .call_with_fallback(|| async { Ok(1) }, || async { Ok(99) })
            .await;
        assert_eq!(result.ok(), Some(99));
    }

    #[tokio::test]
    async fn test_fallback_error_surfaces() {
        let breaker = CircuitBreaker::new("test", test_settings());
        let result: Result<u32, CircuitError<Boom>> = breaker
            .call_with_fallback(|| async { Err(Boom) }, || async { Err(Boom) })
            .await;
        assert!(matches!(result, Err(CircuitError::Inner(Boom))));
        // The primary failure was still recorded.
        assert_eq!(breaker.snapshot().consecutive_failures, 1);
    }
}
