//! Outbound port for health probing.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors a probe can report for a single endpoint check.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Probe timed out")]
    Timeout,

    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Endpoint returned HTTP {0}")]
    BadStatus(u16),
}

/// Port for checking whether a responder endpoint is reachable.
///
/// A successful probe returns the measured round-trip latency.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<Duration, ProbeError>;
}
