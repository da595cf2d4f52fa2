//! OpenAI-compatible HTTP responder.

use async_trait::async_trait;
use conclave_application::{GenerationRequest, Responder, ResponderError, ResponderReply, RetryPolicy};
use conclave_domain::ResponderConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::wire;

/// Responder adapter for any endpoint speaking the chat-completions wire
/// format (GigaChat-style gateways, OpenAI proxies, vLLM, ...).
///
/// Retries here cover transport-level blips only; failover across responders
/// and breaker accounting happen one layer up in the gateway.
pub struct HttpChatResponder {
    name: String,
    model: String,
    url: String,
    api_key: Option<String>,
    requires_key: bool,
    client: Client,
    retry: RetryPolicy,
}

impl HttpChatResponder {
    /// Build an adapter from registry metadata.
    ///
    /// `api_key` is the value resolved from the configured environment
    /// variable; `None` with a configured `api_key_env` leaves the adapter
    /// unconfigured rather than failing construction.
    pub fn new(client: Client, config: &ResponderConfig, api_key: Option<String>) -> Self {
        Self {
            name: config.name.clone(),
            model: config.model.clone(),
            url: chat_completions_url(&config.base_url),
            api_key,
            requires_key: config.api_key_env.is_some(),
            client,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, payload: &Value) -> Result<ResponderReply, ResponderError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| wire::map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(wire::map_status_error(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ResponderError::InvalidResponse(format!("malformed JSON body: {e}")))?;
        wire::parse_reply(body)
    }
}

#[async_trait]
impl Responder for HttpChatResponder {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        !self.requires_key || self.api_key.is_some()
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponderReply, ResponderError> {
        if !self.is_configured() {
            return Err(ResponderError::NotConfigured(format!(
                "{}: API key environment variable is not set",
                self.name
            )));
        }

        let payload = wire::build_payload(&self.model, request);
        debug!(responder = %self.name, model = %self.model, "sending chat completion");
        self.retry.execute(|| self.send(&payload)).await
    }
}

/// Join the configured base URL with the chat-completions path.
fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResponderConfig {
        ResponderConfig::new("gigachat", "GigaChat-Pro", "https://gigachat.example/api/v1/")
            .with_api_key_env("GIGACHAT_API_KEY")
    }

    #[test]
    fn test_url_join_strips_trailing_slash() {
        assert_eq!(
            chat_completions_url("https://host/v1/"),
            "https://host/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_url("https://host/v1"),
            "https://host/v1/chat/completions"
        );
    }

    #[test]
    fn test_configured_only_with_resolved_key() {
        let client = Client::new();
        let with_key = HttpChatResponder::new(client.clone(), &config(), Some("k".to_string()));
        assert!(with_key.is_configured());

        let without_key = HttpChatResponder::new(client.clone(), &config(), None);
        assert!(!without_key.is_configured());

        // No key requirement at all
        let keyless_config = ResponderConfig::new("open", "m", "http://host/v1");
        let open = HttpChatResponder::new(client, &keyless_config, None);
        assert!(open.is_configured());
    }

    #[test]
    fn test_identity_comes_from_registry_entry() {
        let responder = HttpChatResponder::new(Client::new(), &config(), Some("k".to_string()));
        assert_eq!(responder.name(), "gigachat");
        assert_eq!(responder.model_name(), "GigaChat-Pro");
    }

    #[tokio::test]
    async fn test_generate_refuses_when_unconfigured() {
        let responder = HttpChatResponder::new(Client::new(), &config(), None);
        let err = responder
            .generate(&GenerationRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResponderError::NotConfigured(_)));
    }
}
