//! Validation errors raised before a message ever reaches the provider

use thiserror::Error;

/// Why a chat submission was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error(
        "Unknown agent '{0}'. Expected one of: conceptualizer, architect, implementer, tester, deployer, monitor"
    )]
    UnknownAgent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_display() {
        assert_eq!(
            ValidationError::EmptyMessage.to_string(),
            "Message cannot be empty"
        );
    }

    #[test]
    fn test_unknown_agent_display_names_value() {
        let err = ValidationError::UnknownAgent("wizard".to_string());
        let text = err.to_string();
        assert!(text.contains("'wizard'"));
        assert!(text.contains("conceptualizer"));
        assert!(text.contains("monitor"));
    }
}
