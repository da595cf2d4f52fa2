//! Responder health model.
//!
//! The monitor owns one [`ResponderHealth`] per responder and drives it
//! through [`ResponderHealth::record_success`] / [`record_failure`]; the
//! gateway only ever sees snapshots. Transition rules live here so they can
//! be tested without probes or clocks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live availability of a responder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Reachable but slow, or recently failing
    Degraded,
    Unhealthy,
    /// Not probed yet
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Get the string identifier for this status
    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }

    /// Whether a responder in this status may be used for routing.
    /// Only Unhealthy excludes; Unknown passes so cold starts still route.
    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tunables for the probe-result transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    /// Consecutive probe failures before Unhealthy
    pub failure_threshold: u32,
    /// Consecutive probe successes before Healthy
    pub recovery_threshold: u32,
    /// Probe latency above which a success still counts as Degraded
    pub degraded_latency: Duration,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_threshold: 2,
            degraded_latency: Duration::from_secs(2),
        }
    }
}

/// Health record for one responder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResponderHealth {
    pub status: HealthStatus,
    pub latency_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub last_error: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
}

impl ResponderHealth {
    /// Apply a successful probe. Returns the previous status so the caller
    /// can detect transitions.
    pub fn record_success(
        &mut self,
        latency: Duration,
        thresholds: &HealthThresholds,
        now: DateTime<Utc>,
    ) -> HealthStatus {
        let previous = self.status;
        self.consecutive_failures = 0;
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.latency_ms = Some(latency.as_millis() as u64);
        self.last_error = None;
        self.last_check = Some(now);
        if latency > thresholds.degraded_latency {
            self.status = HealthStatus::Degraded;
        } else if self.consecutive_successes >= thresholds.recovery_threshold {
            self.status = HealthStatus::Healthy;
        }
        previous
    }

    /// Apply a failed probe. Returns the previous status.
    pub fn record_failure(
        &mut self,
        error: impl Into<String>,
        thresholds: &HealthThresholds,
        now: DateTime<Utc>,
    ) -> HealthStatus {
        let previous = self.status;
        self.consecutive_successes = 0;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.latency_ms = None;
        self.last_error = Some(error.into());
        self.last_check = Some(now);
        self.status = if self.consecutive_failures >= thresholds.failure_threshold {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };
        previous
    }

    /// Whether this responder may be used for routing
    pub fn is_usable(&self) -> bool {
        self.status.is_usable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> HealthThresholds {
        HealthThresholds {
            failure_threshold: 3,
            recovery_threshold: 2,
            degraded_latency: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_unknown_is_usable() {
        assert!(ResponderHealth::default().is_usable());
    }

    #[test]
    fn test_recovery_needs_threshold_successes() {
        let mut health = ResponderHealth::default();
        let t = thresholds();
        health.record_success(Duration::from_millis(50), &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Unknown);
        health.record_success(Duration::from_millis(50), &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.latency_ms, Some(50));
    }

    #[test]
    fn test_slow_success_degrades() {
        let mut health = ResponderHealth::default();
        let t = thresholds();
        for _ in 0..3 {
            health.record_success(Duration::from_millis(800), &t, Utc::now());
        }
        assert_eq!(health.status, HealthStatus::Degraded);
        assert!(health.is_usable());
    }

    #[test]
    fn test_failures_reach_unhealthy() {
        let mut health = ResponderHealth::default();
        let t = thresholds();
        health.record_failure("connection refused", &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Degraded);
        health.record_failure("connection refused", &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Degraded);
        health.record_failure("connection refused", &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert!(!health.is_usable());
        assert_eq!(health.last_error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let mut health = ResponderHealth::default();
        let t = thresholds();
        health.record_failure("timeout", &t, Utc::now());
        health.record_failure("timeout", &t, Utc::now());
        health.record_success(Duration::from_millis(50), &t, Utc::now());
        assert_eq!(health.consecutive_failures, 0);
        assert!(health.last_error.is_none());
        health.record_failure("timeout", &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_record_returns_previous_status() {
        let mut health = ResponderHealth::default();
        let t = thresholds();
        let prev = health.record_failure("boom", &t, Utc::now());
        assert_eq!(prev, HealthStatus::Unknown);
        let prev = health.record_failure("boom", &t, Utc::now());
        assert_eq!(prev, HealthStatus::Degraded);
    }

    #[test]
    fn test_unhealthy_recovers_after_threshold_successes() {
        let mut health = ResponderHealth::default();
        let t = thresholds();
        for _ in 0..3 {
            health.record_failure("down", &t, Utc::now());
        }
        assert_eq!(health.status, HealthStatus::Unhealthy);
        health.record_success(Duration::from_millis(40), &t, Utc::now());
        // One success is not yet enough to be Healthy again
        assert_eq!(health.status, HealthStatus::Unhealthy);
        health.record_success(Duration::from_millis(40), &t, Utc::now());
        assert_eq!(health.status, HealthStatus::Healthy);
    }
}
