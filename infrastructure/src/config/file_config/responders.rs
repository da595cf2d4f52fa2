//! Responder definitions from TOML (`[responders.<name>]` tables)

use conclave_domain::ResponderConfig;
use serde::{Deserialize, Serialize};

use crate::responders::DEFAULT_LOCAL_BASE_URL;

/// One responder entry.
///
/// The table key becomes the responder name.
///
/// # Example
///
/// ```toml
/// [responders.gigachat]
/// model = "GigaChat-Pro"
/// base_url = "https://gigachat.example/api/v1"
/// health_url = "https://gigachat.example/api/v1/models"
/// api_key_env = "GIGACHAT_API_KEY"
/// priority = 10
///
/// [responders.local]
/// model = "llama3"
/// self_hosted = true       # base_url defaults to http://localhost:11434/v1
/// priority = 1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResponderConfig {
    /// Model identifier sent in the wire payload
    pub model: String,
    /// OpenAI-compatible API root (without /chat/completions)
    pub base_url: String,
    /// Endpoint probed for health; base_url when empty
    pub health_url: Option<String>,
    /// Environment variable holding the bearer token
    pub api_key_env: Option<String>,
    /// Higher wins when ordering responders
    pub priority: u32,
    pub enabled: bool,
    pub self_hosted: bool,
}

impl Default for FileResponderConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            base_url: String::new(),
            health_url: None,
            api_key_env: None,
            priority: 0,
            enabled: true,
            self_hosted: false,
        }
    }
}

impl FileResponderConfig {
    /// Convert into a registry entry under the given table key.
    pub fn to_config(&self, name: &str) -> ResponderConfig {
        let base_url = if self.self_hosted && self.base_url.is_empty() {
            DEFAULT_LOCAL_BASE_URL
        } else {
            self.base_url.as_str()
        };
        let mut config =
            ResponderConfig::new(name, self.model.as_str(), base_url).with_priority(self.priority);
        if let Some(url) = &self.health_url {
            config = config.with_health_url(url.clone());
        }
        if let Some(var) = &self.api_key_env {
            config = config.with_api_key_env(var.clone());
        }
        if self.self_hosted {
            config = config.self_hosted();
        }
        if !self.enabled {
            config = config.disabled();
        }
        config
    }
}
