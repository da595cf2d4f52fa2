//! Health monitoring configuration from TOML (`[health]` section)

use std::time::Duration;

use conclave_application::MonitorSettings;
use conclave_domain::HealthThresholds;
use serde::{Deserialize, Serialize};

/// Health monitor settings
///
/// # Example
///
/// ```toml
/// [health]
/// interval_secs = 60          # pause between probe sweeps
/// probe_timeout_secs = 5      # budget per probe
/// failure_threshold = 3       # consecutive failures before Unhealthy
/// recovery_threshold = 2      # consecutive successes before Healthy
/// degraded_latency_ms = 2000  # slower successes count as Degraded
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHealthConfig {
    pub interval_secs: u64,
    pub probe_timeout_secs: u64,
    pub failure_threshold: u32,
    pub recovery_threshold: u32,
    pub degraded_latency_ms: u64,
}

impl Default for FileHealthConfig {
    fn default() -> Self {
        let settings = MonitorSettings::default();
        Self {
            interval_secs: settings.interval.as_secs(),
            probe_timeout_secs: settings.probe_timeout.as_secs(),
            failure_threshold: settings.thresholds.failure_threshold,
            recovery_threshold: settings.thresholds.recovery_threshold,
            degraded_latency_ms: settings.thresholds.degraded_latency.as_millis() as u64,
        }
    }
}

impl FileHealthConfig {
    pub fn to_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_secs(self.interval_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            thresholds: HealthThresholds {
                failure_threshold: self.failure_threshold,
                recovery_threshold: self.recovery_threshold,
                degraded_latency: Duration::from_millis(self.degraded_latency_ms),
            },
        }
    }
}
