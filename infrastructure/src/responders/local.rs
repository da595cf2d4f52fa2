//! Self-hosted responder (ollama-style endpoint).

use async_trait::async_trait;
use conclave_application::{GenerationRequest, Responder, ResponderError, ResponderReply, RetryPolicy};
use conclave_domain::ResponderConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::wire;

/// Base URL assumed for self-hosted entries that omit one.
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434/v1";

/// Responder adapter for a locally hosted model server.
///
/// Speaks the same chat-completions wire format as [`super::HttpChatResponder`]
/// but never authenticates, so it is always configured and can serve as the
/// offline fallback of last resort.
pub struct LocalResponder {
    name: String,
    model: String,
    url: String,
    client: Client,
    retry: RetryPolicy,
}

impl LocalResponder {
    pub fn new(client: Client, config: &ResponderConfig) -> Self {
        Self {
            name: config.name.clone(),
            model: config.model.clone(),
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            client,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, payload: &Value) -> Result<ResponderReply, ResponderError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
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
impl Responder for LocalResponder {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponderReply, ResponderError> {
        let payload = wire::build_payload(&self.model, request);
        debug!(responder = %self.name, model = %self.model, "sending local chat completion");
        self.retry.execute(|| self.send(&payload)).await
    }
}
