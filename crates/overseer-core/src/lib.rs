//! overseer-core - agent registry and dispatch for Project Overseer
//!
//! This crate provides:
//! - The fixed set of six agent personas and their system prompts
//! - Validated chat requests and total (never-failing) dispatch results
//! - An Anthropic Messages API provider behind the [`LlmProvider`] trait
//! - The in-memory transcript a chat session keeps

pub mod agents;
pub mod dispatch;
pub mod error;
pub mod providers;
pub mod transcript;
pub mod types;

// Re-export main types for convenience
pub use agents::{AgentId, AgentProfile, AgentStatus, registry};
pub use dispatch::Dispatcher;
pub use error::ValidationError;
pub use providers::{AnthropicProvider, LlmProvider};
pub use transcript::{Sender, Transcript, TranscriptEntry};
pub use types::{ChatInput, ChatRequest, ChatResult, ResponseKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Just verify that all main types are exported
        let _ = std::mem::size_of::<Dispatcher>();
        let _ = std::mem::size_of::<AnthropicProvider>();
        let _ = std::mem::size_of::<Transcript>();
        let _ = std::mem::size_of::<ChatRequest>();
        let _ = std::mem::size_of::<ChatResult>();
        assert_eq!(registry().len(), AgentId::ALL.len());
    }
}
