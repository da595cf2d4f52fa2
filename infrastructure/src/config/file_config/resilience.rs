//! Circuit breaker and retry configuration from TOML
//! (`[breaker]` and `[retry]` sections)

use std::time::Duration;

use conclave_application::RetryPolicy;
use conclave_domain::{BackoffStrategy, BreakerSettings, ConfigIssue};
use serde::{Deserialize, Serialize};

/// Circuit breaker settings, applied to every responder.
///
/// # Example
///
/// ```toml
/// [breaker]
/// failure_threshold = 5    # consecutive failures before the breaker opens
/// success_threshold = 3    # half-open successes before it closes again
/// open_timeout_secs = 60   # how long an open breaker rejects calls
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_timeout_secs: u64,
}

impl Default for FileBreakerConfig {
    fn default() -> Self {
        let defaults = BreakerSettings::default();
        Self {
            failure_threshold: defaults.failure_threshold,
            success_threshold: defaults.success_threshold,
            open_timeout_secs: defaults.open_timeout.as_secs(),
        }
    }
}

impl FileBreakerConfig {
    pub fn to_settings(&self) -> BreakerSettings {
        BreakerSettings {
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            open_timeout: Duration::from_secs(self.open_timeout_secs),
        }
    }
}

/// Transport retry settings for responder adapters.
///
/// Defaults to no retries so a single provider failure reaches the gateway's
/// failover logic (and the breaker) unmasked.
///
/// # Example
///
/// ```toml
/// [retry]
/// strategy = "exponential"   # or "fixed", "linear"
/// base_delay_ms = 200
/// max_retries = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Backoff strategy: "fixed", "linear" or "exponential"
    pub strategy: String,
    pub base_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Exponential.to_string(),
            base_delay_ms: 200,
            max_retries: 0,
        }
    }
}

impl FileRetryConfig {
    /// Parse the strategy string, collecting an issue on unknown values.
    pub fn parse_strategy(&self) -> (BackoffStrategy, Vec<ConfigIssue>) {
        match self.strategy.parse::<BackoffStrategy>() {
            Ok(strategy) => (strategy, Vec::new()),
            Err(_) => (
                BackoffStrategy::default(),
                vec![ConfigIssue::warning(
                    "retry.strategy",
                    format!(
                        "unknown value '{}', falling back to 'exponential'",
                        self.strategy
                    ),
                )],
            ),
        }
    }

    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.parse_strategy().0,
            Duration::from_millis(self.base_delay_ms),
            self.max_retries,
        )
    }
}
