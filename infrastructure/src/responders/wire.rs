//! OpenAI-compatible chat wire format.
//!
//! Both responder adapters speak `POST {base}/chat/completions`; this module
//! holds the pure pieces of that exchange so they can be tested without a
//! server: payload construction, reply extraction and error mapping.

use conclave_application::{GenerationRequest, ResponderError, ResponderReply};
use conclave_domain::TokenUsage;
use conclave_domain::util::preview;
use serde_json::{Value, json};

/// How much of an error body survives into an error message.
const BODY_PREVIEW_CHARS: usize = 200;

/// Build the request body for a chat completion.
pub fn build_payload(model: &str, request: &GenerationRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system_prompt {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
        "stream": false,
    })
}

/// Extract the assistant text and usage from a chat completion body.
///
/// The full body is kept on the reply as the raw payload.
pub fn parse_reply(body: Value) -> Result<ResponderReply, ResponderError> {
    let text = body
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ResponderError::InvalidResponse(
                "missing choices[0].message.content in response body".to_string(),
            )
        })?
        .to_string();

    let usage = parse_usage(&body);

    let mut reply = ResponderReply::new(text).with_raw(body);
    if let Some(usage) = usage {
        reply = reply.with_usage(usage);
    }
    Ok(reply)
}

/// Pull token counts out of the `usage` object, if present.
///
/// A missing `total_tokens` is reconstructed as prompt + completion.
pub fn parse_usage(body: &Value) -> Option<TokenUsage> {
    let usage = body.get("usage")?;
    let prompt = usage.get("prompt_tokens").and_then(Value::as_u64)? as u32;
    let completion = usage.get("completion_tokens").and_then(Value::as_u64)? as u32;
    let total = usage
        .get("total_tokens")
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(prompt + completion);
    Some(TokenUsage::new(prompt, completion, total))
}

/// Map a reqwest transport failure onto the responder error space.
pub fn map_transport_error(err: &reqwest::Error) -> ResponderError {
    if err.is_timeout() {
        ResponderError::Timeout
    } else if err.is_connect() {
        ResponderError::Transport(format!("connection failed: {err}"))
    } else {
        ResponderError::Transport(err.to_string())
    }
}

/// Map a non-success HTTP status onto the responder error space.
///
/// 401/403 are credential problems; everything else is transport-shaped so
/// the retry and breaker layers treat it as transient.
pub fn map_status_error(status: reqwest::StatusCode, body: &str) -> ResponderError {
    let snippet = preview(body.trim(), BODY_PREVIEW_CHARS);
    match status.as_u16() {
        401 | 403 => ResponderError::Auth(format!("HTTP {status}: {snippet}")),
        _ => ResponderError::Transport(format!("HTTP {status}: {snippet}")),
    }
}
