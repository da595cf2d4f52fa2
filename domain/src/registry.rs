//! Responder registry: static capability metadata and per-role fallback
//! chains, immutable after load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::role::Role;

/// Static description of one responder (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderConfig {
    pub name: String,
    pub model: String,
    pub base_url: String,
    pub health_url: Option<String>,
    /// Environment variable holding the API key, if the endpoint needs one
    pub api_key_env: Option<String>,
    /// Higher wins when ordering responders
    pub priority: u32,
    pub enabled: bool,
    pub self_hosted: bool,
}

impl ResponderConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            base_url: base_url.into(),
            health_url: None,
            api_key_env: None,
            priority: 0,
            enabled: true,
            self_hosted: false,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = Some(url.into());
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    pub fn self_hosted(mut self) -> Self {
        self.self_hosted = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Endpoint to probe for reachability
    pub fn probe_url(&self) -> &str {
        self.health_url.as_deref().unwrap_or(&self.base_url)
    }
}

/// Ordered fallback chain for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackChain {
    pub role: Role,
    pub primary: String,
    pub fallbacks: Vec<String>,
}

impl FallbackChain {
    pub fn new(role: Role, primary: impl Into<String>) -> Self {
        Self { role, primary: primary.into(), fallbacks: Vec::new() }
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Primary followed by fallbacks, in order
    pub fn ordered(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Immutable lookup table of responders and chains.
///
/// Responders iterate in priority order (highest first, insertion order
/// breaking ties). Built once at startup by the config layer.
#[derive(Debug, Clone, Default)]
pub struct ResponderRegistry {
    configs: Vec<ResponderConfig>,
    chains: HashMap<Role, FallbackChain>,
    default_responder: Option<String>,
    offline_responder: Option<String>,
}

impl ResponderRegistry {
    pub fn new(mut configs: Vec<ResponderConfig>) -> Self {
        // Stable sort keeps insertion order within the same priority
        configs.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            configs,
            chains: HashMap::new(),
            default_responder: None,
            offline_responder: None,
        }
    }

    pub fn with_chains(mut self, chains: Vec<FallbackChain>) -> Self {
        self.chains = chains.into_iter().map(|c| (c.role.clone(), c)).collect();
        self
    }

    pub fn with_default_responder(mut self, name: impl Into<String>) -> Self {
        self.default_responder = Some(name.into());
        self
    }

    pub fn with_offline_responder(mut self, name: impl Into<String>) -> Self {
        self.offline_responder = Some(name.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResponderConfig> {
        self.configs.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn chain_for(&self, role: &Role) -> Option<&FallbackChain> {
        self.chains.get(role)
    }

    pub fn default_responder(&self) -> Option<&str> {
        self.default_responder.as_deref()
    }

    /// The designated last-resort responder: the explicitly configured one,
    /// or the first enabled self-hosted entry.
    pub fn offline_responder(&self) -> Option<&str> {
        self.offline_responder
            .as_deref()
            .or_else(|| self.configs.iter().find(|c| c.enabled && c.self_hosted).map(|c| c.name.as_str()))
    }

    /// All responders in priority order
    pub fn iter(&self) -> impl Iterator<Item = &ResponderConfig> {
        self.configs.iter()
    }

    /// Enabled responders in priority order
    pub fn enabled(&self) -> impl Iterator<Item = &ResponderConfig> {
        self.configs.iter().filter(|c| c.enabled)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
