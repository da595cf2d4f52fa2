//! Gateway routing configuration from TOML (`[gateway]` section)

use std::time::Duration;

use conclave_application::GatewaySettings;
use conclave_domain::BreakerSettings;
use serde::{Deserialize, Serialize};

/// Gateway routing settings
///
/// # Example
///
/// ```toml
/// [gateway]
/// default_responder = "gigachat"   # used when the request carries no role
/// offline_responder = "local"      # last resort when every chain member failed
/// call_timeout_secs = 30           # per-call budget
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Responder used when the request carries no role.
    /// Empty means "highest-priority enabled responder".
    pub default_responder: Option<String>,
    /// Explicit last-resort responder; empty means "first enabled
    /// self-hosted entry".
    pub offline_responder: Option<String>,
    /// Per-call timeout in seconds
    pub call_timeout_secs: u64,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            default_responder: None,
            offline_responder: None,
            call_timeout_secs: 30,
        }
    }
}

impl FileGatewayConfig {
    /// Convert into gateway settings, pairing with the breaker section.
    pub fn to_settings(&self, breaker: BreakerSettings) -> GatewaySettings {
        GatewaySettings {
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            breaker,
            ..GatewaySettings::default()
        }
    }
}
