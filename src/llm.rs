use crate::config::Config;
use crate::error::TransportFailure;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Duration;
use tracing::{debug, info};

/// Endpoint used when no configuration overrides it
pub const DEFAULT_ENDPOINT: &str = "https://ai-worker.251376168.workers.dev/api/chat";

/// Bot text when the endpoint answers without a usable reply field
pub const NO_REPLY_FALLBACK: &str = "Sorry, I couldn't process your request.";

/// Body of the single POST sent per submitted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: new_conversation_id(),
        }
    }
}

/// Fresh, time-derived identifier. A new one is minted for every request.
pub fn new_conversation_id() -> String {
    format!("chat_{}", chrono::Utc::now().timestamp_millis())
}

/// Pick the bot text out of a decoded response body.
///
/// `response` wins over `message`; empty strings and non-string values count
/// as absent.
pub fn reply_text(body: &Value) -> String {
    ["response", "message"]
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(NO_REPLY_FALLBACK)
        .to_string()
}

/// Something that can carry one chat exchange
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and return the bot text to display
    async fn send(&self, request: &ChatRequest) -> Result<String, TransportFailure>;
}

/// HTTP client for the remote chat endpoint
#[derive(Clone)]
pub struct LlmClient {
    endpoint: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for LlmClient {
    async fn send(&self, request: &ChatRequest) -> Result<String, TransportFailure> {
        info!(endpoint = %self.endpoint, conversation_id = %request.conversation_id, "sending message");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        debug!(%status, "received response");

        Ok(reply_text(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_field_is_preferred() {
        assert_eq!(reply_text(&json!({"response": "hi", "message": "other"})), "hi");
    }

    #[test]
    fn message_field_is_used_without_response() {
        assert_eq!(reply_text(&json!({"message": "hi"})), "hi");
        assert_eq!(reply_text(&json!({"response": "", "message": "hi"})), "hi");
    }

    #[test]
    fn unusable_shapes_fall_back() {
        assert_eq!(reply_text(&json!({})), NO_REPLY_FALLBACK);
        assert_eq!(reply_text(&json!({"response": 42})), NO_REPLY_FALLBACK);
        assert_eq!(reply_text(&json!(["response"])), NO_REPLY_FALLBACK);
        assert_eq!(reply_text(&Value::Null), NO_REPLY_FALLBACK);
    }

    #[test]
    fn conversation_ids_are_time_derived() {
        let request = ChatRequest::new("hello");
        let millis = request.conversation_id.strip_prefix("chat_").unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "hello", "conversation_id": request.conversation_id})
        );
    }
}
