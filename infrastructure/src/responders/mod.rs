//! Responder adapter construction.

pub mod http_chat;
pub mod local;
pub mod wire;

pub use http_chat::HttpChatResponder;
pub use local::{DEFAULT_LOCAL_BASE_URL, LocalResponder};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use conclave_application::{Responder, RetryPolicy};
use conclave_domain::ResponderRegistry;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

/// Connect budget for the shared HTTP client. Per-call deadlines are owned
/// by the gateway, so only connection establishment is bounded here.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ResponderBuildError {
    #[error("Failed to construct HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build one adapter per enabled registry entry, all sharing one client.
///
/// Self-hosted entries get a [`LocalResponder`]; everything else gets an
/// [`HttpChatResponder`] with its key resolved from the configured
/// environment variable. A missing key is not an error here: the adapter is
/// built unconfigured and the gateway skips it during chain resolution.
pub fn build_responders(
    registry: &ResponderRegistry,
    retry: RetryPolicy,
) -> Result<HashMap<String, Arc<dyn Responder>>, ResponderBuildError> {
    let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

    let mut adapters: HashMap<String, Arc<dyn Responder>> = HashMap::new();
    for config in registry.enabled() {
        let adapter: Arc<dyn Responder> = if config.self_hosted {
            Arc::new(LocalResponder::new(client.clone(), config).with_retry(retry))
        } else {
            let api_key = resolve_api_key(config.api_key_env.as_deref());
            if config.api_key_env.is_some() && api_key.is_none() {
                warn!(
                    responder = %config.name,
                    var = config.api_key_env.as_deref().unwrap_or(""),
                    "API key variable is not set; responder will be skipped"
                );
            }
            Arc::new(HttpChatResponder::new(client.clone(), config, api_key).with_retry(retry))
        };
        debug!(responder = %config.name, model = %config.model, "built responder adapter");
        adapters.insert(config.name.clone(), adapter);
    }
    Ok(adapters)
}

/// Read the key from the environment, treating empty values as unset.
fn resolve_api_key(var: Option<&str>) -> Option<String> {
    let var = var?;
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
