//! HTTP health probe.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use conclave_application::{HealthProbe, ProbeError};
use reqwest::Client;
use tracing::debug;

/// Probes responder endpoints with a bare GET and measures latency.
///
/// Any status below 500 counts as reachable: auth-walled chat APIs answer
/// 401/404 to unauthenticated GETs while being fully operational. 5xx and
/// transport failures count against the responder.
pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpHealthProbe {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<Duration, ProbeError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() >= 500 {
            return Err(ProbeError::BadStatus(status.as_u16()));
        }

        let latency = started.elapsed();
        debug!(url, status = status.as_u16(), latency_ms = latency.as_millis() as u64, "probe ok");
        Ok(latency)
    }
}
