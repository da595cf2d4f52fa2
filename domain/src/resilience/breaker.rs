//! Circuit breaker state machine.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: responder assumed down, calls fail fast
//! - Half-Open: probing whether the responder recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: open_timeout elapsed since opened_at
//! Half-Open → Closed: consecutive successes >= success_threshold
//! Half-Open → Open: any failure
//! ```
//!
//! The machine is pure: time is passed in by the caller, so transitions are
//! deterministic and testable without sleeping. The async wrapper that owns
//! the lock lives in the application layer.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    /// Get the string identifier for this state
    pub fn as_str(&self) -> &str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half-open",
        }
    }
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Breaker tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Consecutive failures in Closed that trip the breaker
    pub failure_threshold: u32,
    /// Consecutive successes in Half-Open that close the breaker
    pub success_threshold: u32,
    /// How long an Open breaker rejects before probing again
    pub open_timeout: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            open_timeout: Duration::from_secs(60),
        }
    }
}

/// Lock-free copy of a breaker's observable state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
}

/// The state machine itself. One per responder, mutated only by its owner.
#[derive(Debug)]
pub struct BreakerCore {
    settings: BreakerSettings,
    state: BreakerState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    last_failure_at: Option<Instant>,
    opened_at: Option<Instant>,
}

impl BreakerCore {
    pub fn new(settings: BreakerSettings) -> Self {
        Self {
            settings,
            state: BreakerState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            last_failure_at: None,
            opened_at: None,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn settings(&self) -> &BreakerSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            consecutive_successes: self.consecutive_successes,
        }
    }

    /// Whether a call may proceed right now.
    ///
    /// In Open, once `open_timeout` has elapsed the breaker moves to
    /// Half-Open as a side effect and the call is allowed through as a probe.
    pub fn should_attempt(&mut self, now: Instant) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => match self.opened_at {
                Some(at) if now.duration_since(at) < self.settings.open_timeout => false,
                _ => {
                    self.state = BreakerState::HalfOpen;
                    self.consecutive_successes = 0;
                    true
                }
            },
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        match self.state {
            BreakerState::Closed => {
                self.consecutive_failures = 0;
            }
            BreakerState::HalfOpen => {
                if self.consecutive_successes >= self.settings.success_threshold {
                    self.state = BreakerState::Closed;
                    self.consecutive_failures = 0;
                    self.consecutive_successes = 0;
                    self.opened_at = None;
                }
            }
            // A call that was already in flight when the breaker opened.
            BreakerState::Open => {}
        }
    }

    pub fn record_failure(&mut self, now: Instant) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
        self.last_failure_at = Some(now);
        match self.state {
            BreakerState::Closed => {
                if self.consecutive_failures >= self.settings.failure_threshold {
                    self.state = BreakerState::Open;
                    self.opened_at = Some(now);
                }
            }
            BreakerState::HalfOpen => {
                self.state = BreakerState::Open;
                self.opened_at = Some(now);
            }
            BreakerState::Open => {}
        }
    }

    pub fn last_failure_at(&self) -> Option<Instant> {
        self.last_failure_at
    }
}

impl Default for BreakerCore {
    fn default() -> Self {
        Self::new(BreakerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BreakerSettings {
        BreakerSettings {
            failure_threshold: 3,
            success_threshold: 2,
            open_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_closed_allows_calls() {
        let mut core = BreakerCore::new(settings());
        assert!(core.should_attempt(Instant::now()));
        assert_eq!(core.state(), BreakerState::Closed);
    }

    #[test]
    fn test_opens_after_failure_threshold() {
        let mut core = BreakerCore::new(settings());
        let now = Instant::now();
        core.record_failure(now);
        core.record_failure(now);
        assert_eq!(core.state(), BreakerState::Closed);
        core.record_failure(now);
        assert_eq!(core.state(), BreakerState::Open);
        assert!(!core.should_attempt(now));
    }

    #[test]
    fn test_success_heals_failures_in_closed() {
        let mut core = BreakerCore::new(settings());
        let now = Instant::now();
        core.record_failure(now);
        core.record_failure(now);
        core.record_success();
        assert_eq!(core.snapshot().consecutive_failures, 0);
        core.record_failure(now);
        core.record_failure(now);
        // Two failures after the reset are still below the threshold
        assert_eq!(core.state(), BreakerState::Closed);
    }

    #[test]
    fn test_open_probes_after_timeout() {
        let mut core = BreakerCore::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            core.record_failure(now);
        }
        assert!(!core.should_attempt(now));
        let later = now + Duration::from_secs(10);
        assert!(core.should_attempt(later));
        assert_eq!(core.state(), BreakerState::HalfOpen);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let mut core = BreakerCore::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            core.record_failure(now);
        }
        let later = now + Duration::from_secs(11);
        assert!(core.should_attempt(later));
        core.record_failure(later);
        assert_eq!(core.state(), BreakerState::Open);
        // Fresh open period starts from the new failure
        assert!(!core.should_attempt(later + Duration::from_secs(5)));
        assert!(core.should_attempt(later + Duration::from_secs(10)));
    }

    #[test]
    fn test_half_open_closes_after_success_threshold() {
        let mut core = BreakerCore::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            core.record_failure(now);
        }
        let later = now + Duration::from_secs(10);
        assert!(core.should_attempt(later));
        core.record_success();
        assert_eq!(core.state(), BreakerState::HalfOpen);
        core.record_success();
        assert_eq!(core.state(), BreakerState::Closed);
        let snap = core.snapshot();
        assert_eq!(snap.consecutive_failures, 0);
        assert_eq!(snap.consecutive_successes, 0);
    }

    #[test]
    fn test_half_open_success_reset_by_failure() {
        let mut core = BreakerCore::new(settings());
        let now = Instant::now();
        for _ in 0..3 {
            core.record_failure(now);
        }
        let later = now + Duration::from_secs(10);
        assert!(core.should_attempt(later));
        core.record_success();
        core.record_failure(later);
        assert_eq!(core.state(), BreakerState::Open);
        assert_eq!(core.snapshot().consecutive_successes, 0);
    }
}
