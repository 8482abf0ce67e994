//! Provider-agnostic types for the LLM seam

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single conversation turn sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Message role. Dispatch only ever sends the user's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Provider-agnostic response from an LLM
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub blocks: Vec<ChatResponseBlock>,
    pub stop_reason: StopReason,
    pub usage: ChatUsage,
}

/// One segment of the response, in the order the provider returned them
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResponseBlock {
    Text { text: String },
    ToolCall { id: String, name: String, input: Value },
    /// A segment kind this crate does not understand
    Other { kind: String },
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Unknown,
}

/// Token usage from a single API call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Trait that all LLM providers implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic")
    fn provider_name(&self) -> &str;

    /// Model identifier (e.g. "claude-3-opus-20240229")
    fn model(&self) -> &str;

    /// Send one request with a system prompt and the given turns
    async fn chat(&self, messages: &[ChatMessage], system: &str) -> Result<ChatResponse>;
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
        }
    }
}

impl StopReason {
    pub fn from_wire(s: Option<&str>) -> Self {
        match s {
            Some("tool_use") => Self::ToolUse,
            Some("end_turn") => Self::EndTurn,
            Some("max_tokens") => Self::MaxTokens,
            _ => Self::Unknown,
        }
    }
}

impl ChatResponse {
    /// Response holding a single text segment
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![ChatResponseBlock::Text { text: text.into() }],
            stop_reason: StopReason::EndTurn,
            usage: ChatUsage::default(),
        }
    }

    pub fn first_block(&self) -> Option<&ChatResponseBlock> {
        self.blocks.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_display() {
        assert_eq!(ChatRole::User.to_string(), "user");
    }

    #[test]
    fn test_stop_reason_from_wire() {
        assert_eq!(StopReason::from_wire(Some("end_turn")), StopReason::EndTurn);
        assert_eq!(StopReason::from_wire(Some("tool_use")), StopReason::ToolUse);
        assert_eq!(
            StopReason::from_wire(Some("max_tokens")),
            StopReason::MaxTokens
        );
        assert_eq!(StopReason::from_wire(Some("pause")), StopReason::Unknown);
        assert_eq!(StopReason::from_wire(None), StopReason::Unknown);
    }

    #[test]
    fn test_user_message_serializes_as_wire_turn() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));
    }

    #[test]
    fn test_text_response_helper() {
        let resp = ChatResponse::text("Hello");
        assert_eq!(
            resp.first_block(),
            Some(&ChatResponseBlock::Text {
                text: "Hello".to_string()
            })
        );
        assert_eq!(resp.usage, ChatUsage::default());
    }
}
