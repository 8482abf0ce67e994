//! Shared request/result types for overseer-core

use serde::{Deserialize, Serialize};

use crate::agents::AgentId;
use crate::error::ValidationError;

/// Raw, unvalidated chat submission as it arrives from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub agent: String,
}

/// A validated chat submission: non-empty message addressed to a known agent.
///
/// The only ways to obtain one are [`ChatRequest::new`], `TryFrom<ChatInput>`,
/// or deserialization, which runs the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChatInput")]
pub struct ChatRequest {
    message: String,
    agent: AgentId,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, agent: AgentId) -> Result<Self, ValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(Self { message, agent })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }
}

impl TryFrom<ChatInput> for ChatRequest {
    type Error = ValidationError;

    fn try_from(input: ChatInput) -> Result<Self, Self::Error> {
        let agent = input.agent.parse::<AgentId>()?;
        Self::new(input.message, agent)
    }
}

/// How the first response segment was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    #[default]
    Text,
    ToolUse,
    Unrecognized,
}

/// Outcome of one dispatch. Failures are carried as data, never as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub success: bool,
    pub message: String,
    pub agent: AgentId,
    #[serde(rename = "type", default)]
    pub kind: ResponseKind,
}

impl ChatResult {
    pub fn success(agent: AgentId, message: impl Into<String>, kind: ResponseKind) -> Self {
        Self {
            success: true,
            message: message.into(),
            agent,
            kind,
        }
    }

    pub fn failure(agent: AgentId, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            agent,
            kind: ResponseKind::Text,
        }
    }
}
