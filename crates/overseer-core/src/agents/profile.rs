//! Agent profile: a persona's identity, prompt, and presentation hints

use serde::Serialize;

use super::registry::AgentId;

/// Availability shown next to an agent in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
    Warning,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Warning => "warning",
        })
    }
}

/// Static description of one persona. Profiles live for the whole process
/// and are never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: &'static str,
    pub description: &'static str,
    pub status: AgentStatus,
    /// System prompt sent with every message addressed to this agent
    pub system_prompt: &'static str,
    /// Hex color token used by the UI
    pub color: &'static str,
    pub rune: &'static str,
    pub capabilities: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_matches_serde() {
        for status in [AgentStatus::Active, AgentStatus::Inactive, AgentStatus::Warning] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_all_profiles_active() {
        for id in AgentId::ALL {
            assert_eq!(id.profile().status, AgentStatus::Active, "{} should be active", id);
        }
    }

    #[test]
    fn test_profile_serialization() {
        let json = serde_json::to_value(AgentId::Deployer.profile()).unwrap();
        assert_eq!(json["id"], "deployer");
        assert_eq!(json["name"], "Deployer");
        assert_eq!(json["status"], "active");
        assert_eq!(json["color"], "#F59E0B");
        assert_eq!(json["capabilities"].as_array().unwrap().len(), 3);
    }
}
