use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::Result;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// A single turn of the conversation as sent to the Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [PromptMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Thin client for the Anthropic Messages API. The base URL is
/// configurable so tests can point it at a local mock.
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url("https://api.anthropic.com".to_string(), api_key, model)
    }

    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// Sends the transcript and returns the first text block of the
    /// assistant reply. Transport failures and non-success statuses
    /// both surface as `UpstreamError`.
    pub async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        debug!("Requesting completion for {} messages", messages.len());

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                max_tokens: MAX_TOKENS,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "model API returned {}: {}",
                status, body
            )));
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| {
                AppError::UpstreamError("model API response contained no text block".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> AnthropicClient {
        AnthropicClient::with_base_url(
            base_url,
            "test-key".to_string(),
            "claude-3-5-haiku-latest".to_string(),
        )
    }

    #[tokio::test]
    async fn test_complete_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "Hello there" }
                ]
            })))
            .mount(&server)
            .await;

        let reply = client(server.uri())
            .complete(&[PromptMessage::new("user", "Hi")])
            .await
            .unwrap();
        assert_eq!(reply, "Hello there");
    }

    #[tokio::test]
    async fn test_complete_maps_api_error_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "type": "rate_limit_error" }
            })))
            .mount(&server)
            .await;

        let err = client(server.uri())
            .complete(&[PromptMessage::new("user", "Hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_complete_rejects_reply_without_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": []
            })))
            .mount(&server)
            .await;

        let err = client(server.uri())
            .complete(&[PromptMessage::new("user", "Hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_complete_unreachable_api_is_upstream_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let err = client(uri)
            .complete(&[PromptMessage::new("user", "Hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }
}
