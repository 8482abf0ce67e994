//! LLM provider abstraction
//!
//! The dispatcher talks to models only through [`LlmProvider`], which keeps the
//! Anthropic client swappable for a scripted provider in tests.

pub mod anthropic;
pub mod types;

pub use anthropic::{AnthropicProvider, mask_secret};
pub use types::{
    ChatMessage, ChatResponse, ChatResponseBlock, ChatRole, ChatUsage, LlmProvider, StopReason,
};
