//! Retry backoff delay law.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// How the delay between retry attempts grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay every attempt
    Fixed,
    /// Delay grows by `base` each attempt
    Linear,
    /// Delay doubles each attempt
    #[default]
    Exponential,
}

impl BackoffStrategy {
    /// Delay before re-running attempt `attempt` (0-based: the delay after
    /// the first failure is `delay_for(0, base)`).
    pub fn delay_for(&self, attempt: u32, base: Duration) -> Duration {
        match self {
            BackoffStrategy::Fixed => base,
            BackoffStrategy::Linear => base.saturating_mul(attempt.saturating_add(1)),
            BackoffStrategy::Exponential => {
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                base.saturating_mul(factor)
            }
        }
    }

    /// Get the string identifier for this strategy
    pub fn as_str(&self) -> &str {
        match self {
            BackoffStrategy::Fixed => "fixed",
            BackoffStrategy::Linear => "linear",
            BackoffStrategy::Exponential => "exponential",
        }
    }
}

impl std::fmt::Display for BackoffStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackoffStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(BackoffStrategy::Fixed),
            "linear" => Ok(BackoffStrategy::Linear),
            "exponential" => Ok(BackoffStrategy::Exponential),
            other => Err(DomainError::UnknownStrategy(other.to_string())),
        }
    }
}
