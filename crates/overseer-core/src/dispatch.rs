//! Dispatcher: sends one validated message to its agent and normalizes the reply
//!
//! [`Dispatcher::dispatch`] is total: provider failures are logged and folded
//! into a failed [`ChatResult`], so callers never handle errors from it.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::providers::{ChatMessage, ChatResponse, ChatResponseBlock, LlmProvider, StopReason};
use crate::types::{ChatRequest, ChatResult, ResponseKind};

pub const TOOL_USE_PLACEHOLDER: &str = "Received a tool use response";
pub const UNRECOGNIZED_PLACEHOLDER: &str = "Received an unrecognized response type";

/// Routes chat requests to the model with the addressed agent's system prompt.
/// Holds no per-conversation state.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Send `request` as the sole user turn and wait for one response
    pub async fn dispatch(&self, request: &ChatRequest) -> ChatResult {
        let agent = request.agent();
        let profile = agent.profile();

        info!(
            "Dispatching to {} via {} ({} chars)",
            profile.name,
            self.provider.model(),
            request.message().chars().count()
        );

        let messages = [ChatMessage::user(request.message())];
        match self.provider.chat(&messages, profile.system_prompt).await {
            Ok(response) => {
                let (message, kind) = normalize_response(&response);
                debug!(
                    "Agent '{}' replied: kind={:?}, stop={:?}, blocks={}, tokens in={} out={}",
                    agent,
                    kind,
                    response.stop_reason,
                    response.blocks.len(),
                    response.usage.input_tokens,
                    response.usage.output_tokens
                );
                if response.stop_reason == StopReason::MaxTokens {
                    warn!("Reply from '{}' was cut off at the token limit", agent);
                }
                ChatResult::success(agent, message, kind)
            }
            Err(e) => {
                error!(
                    "{} API error for agent '{}': {:#}",
                    self.provider.provider_name(),
                    agent,
                    e
                );
                ChatResult::failure(agent, format!("{:#}", e))
            }
        }
    }
}

/// Reduce a response to display text using only its first segment
pub fn normalize_response(response: &ChatResponse) -> (String, ResponseKind) {
    match response.first_block() {
        Some(ChatResponseBlock::Text { text }) => (text.clone(), ResponseKind::Text),
        Some(ChatResponseBlock::ToolCall { .. }) => {
            (TOOL_USE_PLACEHOLDER.to_string(), ResponseKind::ToolUse)
        }
        Some(ChatResponseBlock::Other { .. }) | None => (
            UNRECOGNIZED_PLACEHOLDER.to_string(),
            ResponseKind::Unrecognized,
        ),
    }
}
