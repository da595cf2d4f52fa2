//! Gateway response value objects

use serde::{Deserialize, Serialize};

use crate::core::role::Role;

/// Token accounting reported by a responder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self { prompt_tokens, completion_tokens, total_tokens }
    }
}

/// Metadata attached to every gateway response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResponseMetadata {
    pub role: Option<String>,
    pub usage: Option<TokenUsage>,
    /// Raw provider payload, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    pub latency_ms: Option<u64>,
    /// Served from the response cache
    pub cached: bool,
    /// Produced by the last-resort offline path
    pub offline: bool,
    /// Diagnostic stand-in, no responder produced an answer
    pub placeholder: bool,
}

/// What the gateway hands back for every call (Value Object)
///
/// A gateway call never fails: the degraded outcomes are encoded in
/// [`ResponseMetadata::offline`] and [`ResponseMetadata::placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub responder: String,
    pub model: String,
    pub text: String,
    pub metadata: ResponseMetadata,
}

impl GatewayResponse {
    pub fn new(responder: impl Into<String>, model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            responder: responder.into(),
            model: model.into(),
            text: text.into(),
            metadata: ResponseMetadata::default(),
        }
    }

    /// Diagnostic stand-in for "no responder produced an answer"
    pub fn placeholder(reason: impl Into<String>) -> Self {
        let mut response = Self::new("none", "none", reason);
        response.metadata.placeholder = true;
        response
    }

    pub fn with_role(mut self, role: &Role) -> Self {
        self.metadata.role = Some(role.as_str().to_string());
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.metadata.usage = Some(usage);
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.metadata.raw = Some(raw);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.metadata.latency_ms = Some(latency_ms);
        self
    }

    pub fn mark_cached(mut self) -> Self {
        self.metadata.cached = true;
        self
    }

    pub fn mark_offline(mut self) -> Self {
        self.metadata.offline = true;
        self
    }

    /// True when the caller got something other than a live first-class answer
    pub fn is_degraded(&self) -> bool {
        self.metadata.offline || self.metadata.placeholder
    }
}
