//! Anthropic Claude provider

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::types::{
    ChatMessage, ChatResponse, ChatResponseBlock, ChatUsage, LlmProvider, StopReason,
};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
#[derive(Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicProvider {
    /// Build a provider. An empty `api_key` is accepted here; requests made
    /// without a key fail individually.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens,
        })
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(&self, messages: &[ChatMessage], system: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": messages,
        })
    }

    /// Convert Anthropic response to provider-agnostic format
    fn from_anthropic_response(resp: AnthropicApiResponse) -> ChatResponse {
        let blocks = resp.content.into_iter().map(parse_block).collect();

        ChatResponse {
            blocks,
            stop_reason: StopReason::from_wire(resp.stop_reason.as_deref()),
            usage: ChatUsage {
                input_tokens: resp.usage.input_tokens,
                output_tokens: resp.usage.output_tokens,
            },
        }
    }
}

/// Map one raw content segment by its `type` tag. Unknown tags are kept as
/// [`ChatResponseBlock::Other`] rather than failing the whole response.
fn parse_block(raw: Value) -> ChatResponseBlock {
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match kind.as_str() {
        "text" => ChatResponseBlock::Text {
            text: raw
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "tool_use" => ChatResponseBlock::ToolCall {
            id: raw
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: raw
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            input: raw.get("input").cloned().unwrap_or(Value::Null),
        },
        _ => ChatResponseBlock::Other { kind },
    }
}

/// Pull the human-readable message out of an Anthropic error body, falling
/// back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<AnthropicErrorBody>(body)
        .map(|e| format!("{}: {}", e.error.kind, e.error.message))
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Mask a secret for display: first 3 and last 4 chars of longer keys, "***" otherwise.
pub fn mask_secret(key: &str) -> String {
    if key.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage], system: &str) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            bail!("ANTHROPIC_API_KEY is not set; cannot call the Anthropic API");
        }

        let url = format!("{}/v1/messages", self.base_url);
        let body = self.request_body(messages, system);

        debug!(
            "Anthropic request: model={}, messages={}",
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Anthropic API request failed with status {}: {}",
                status,
                api_error_message(&error_text)
            ));
        }

        let api_response: AnthropicApiResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        debug!(
            "Anthropic response: blocks={}, stop_reason={:?}",
            api_response.content.len(),
            api_response.stop_reason
        );

        Ok(Self::from_anthropic_response(api_response))
    }
}

// ── Anthropic wire types ──

#[derive(Debug, Clone, Deserialize)]
struct AnthropicApiResponse {
    content: Vec<Value>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(key: &str) -> AnthropicProvider {
        AnthropicProvider::new(key, DEFAULT_MODEL, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS).unwrap()
    }

    fn parse(json: Value) -> ChatResponse {
        let resp: AnthropicApiResponse = serde_json::from_value(json).unwrap();
        AnthropicProvider::from_anthropic_response(resp)
    }

    #[test]
    fn test_request_body_shape() {
        let body = provider("k").request_body(&[ChatMessage::user("hi")], "be brief");
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_from_anthropic_response_text() {
        let result = parse(serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "content": [{"type": "text", "text": "Hello!"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }));
        assert_eq!(result.stop_reason, StopReason::EndTurn);
        assert_eq!(result.usage.input_tokens, 10);
        assert_eq!(
            result.blocks,
            vec![ChatResponseBlock::Text {
                text: "Hello!".to_string()
            }]
        );
    }

    #[test]
    fn test_from_anthropic_response_tool_use() {
        let result = parse(serde_json::json!({
            "id": "msg_2",
            "content": [{"type": "tool_use", "id": "tu_1", "name": "search", "input": {"q": "x"}}],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 15}
        }));
        assert_eq!(result.stop_reason, StopReason::ToolUse);
        assert!(
            matches!(&result.blocks[0], ChatResponseBlock::ToolCall { name, input, .. } if name == "search" && input["q"] == "x")
        );
    }

    #[test]
    fn test_from_anthropic_response_unknown_segment() {
        let result = parse(serde_json::json!({
            "content": [{"type": "thinking", "thinking": "..."}, {"type": "text", "text": "later"}]
        }));
        assert_eq!(
            result.blocks[0],
            ChatResponseBlock::Other {
                kind: "thinking".to_string()
            }
        );
        assert_eq!(result.blocks.len(), 2);
        assert_eq!(result.stop_reason, StopReason::Unknown);
        assert_eq!(result.usage, ChatUsage::default());
    }

    #[test]
    fn test_text_segment_without_text_is_empty() {
        let result = parse(serde_json::json!({"content": [{"type": "text"}]}));
        assert_eq!(
            result.blocks[0],
            ChatResponseBlock::Text {
                text: String::new()
            }
        );
    }

    #[test]
    fn test_api_error_message_extracts_detail() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            api_error_message(body),
            "authentication_error: invalid x-api-key"
        );
        assert_eq!(api_error_message(" upstream timeout \n"), "upstream timeout");
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_request_time() {
        let provider = provider("");
        let err = provider
            .chat(&[ChatMessage::user("hello")], "system")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = AnthropicProvider::new("k", DEFAULT_MODEL, "http://localhost:9000/", 10).unwrap();
        assert_eq!(p.base_url(), "http://localhost:9000");
        assert_eq!(p.max_tokens(), 10);
    }

    #[test]
    fn test_debug_masks_key() {
        let debug = format!("{:?}", provider("sk-ant-1234567890abcdef"));
        assert!(debug.contains("sk-...cdef"));
        assert!(!debug.contains("sk-ant-1234567890abcdef"));

        let short = format!("{:?}", provider("short"));
        assert!(short.contains("***"));
        assert!(!short.contains("short"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(empty)");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("sk-ant-1234567890abcdef"), "sk-...cdef");
        assert_eq!(mask_secret("ключ-секрет-длинный"), "клю...нный");
    }
}
