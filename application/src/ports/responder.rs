//! Outbound port for LLM responders.
//!
//! Infrastructure adapters (HTTP chat APIs, local runtimes) implement this
//! trait. The application layer never talks to a provider SDK directly.

use async_trait::async_trait;
use conclave_domain::TokenUsage;
use thiserror::Error;

/// Sampling temperature applied when the caller does not override it.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Completion budget applied when the caller does not override it.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// A single generation request as seen by a responder adapter.
///
/// This is deliberately smaller than the gateway-level request: routing
/// concerns (role, cache, timeout) are resolved before an adapter sees it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// What a responder returns on success.
#[derive(Debug, Clone)]
pub struct ResponderReply {
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub raw: Option<serde_json::Value>,
}

impl ResponderReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            raw: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Errors that can occur when calling a responder.
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Responder not configured: {0}")]
    NotConfigured(String),

    #[error("Responder error: {0}")]
    Other(String),
}

impl ResponderError {
    /// Check if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResponderError::Timeout)
    }

    /// Check if this error is retryable (transient rather than structural).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResponderError::Timeout | ResponderError::Transport(_))
    }
}

/// Port for a single LLM responder.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Registry name of this responder (e.g. "gigachat").
    fn name(&self) -> &str;

    /// Model identifier reported back in responses.
    fn model_name(&self) -> &str;

    /// Whether the adapter has everything it needs (credentials, URLs).
    fn is_configured(&self) -> bool {
        true
    }

    /// Generate a completion for the given request.
    async fn generate(&self, request: &GenerationRequest)
    -> Result<ResponderReply, ResponderError>;
}
