//! The fixed persona table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::profile::{AgentProfile, AgentStatus};
use crate::error::ValidationError;

/// Identifier of one of the six personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    #[default]
    Conceptualizer,
    Architect,
    Implementer,
    Tester,
    Deployer,
    Monitor,
}

impl AgentId {
    /// Every agent, in display order
    pub const ALL: [AgentId; 6] = [
        AgentId::Conceptualizer,
        AgentId::Architect,
        AgentId::Implementer,
        AgentId::Tester,
        AgentId::Deployer,
        AgentId::Monitor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conceptualizer => "conceptualizer",
            Self::Architect => "architect",
            Self::Implementer => "implementer",
            Self::Tester => "tester",
            Self::Deployer => "deployer",
            Self::Monitor => "monitor",
        }
    }

    /// The static profile for this agent
    pub fn profile(self) -> &'static AgentProfile {
        &PROFILES[self as usize]
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAgent(s.to_string()))
    }
}

/// All six profiles, in display order
pub fn registry() -> &'static [AgentProfile] {
    &PROFILES
}

// Indexed by `AgentId as usize`; order must match the enum.
static PROFILES: [AgentProfile; 6] = [
    AgentProfile {
        id: AgentId::Conceptualizer,
        name: "Conceptualizer",
        description: "Generates innovative project concepts and initial strategies",
        status: AgentStatus::Active,
        system_prompt: "You are a conceptualization AI agent for Project Overseer. \
            Your role is to transform high-level requirements into detailed project concepts. \
            Provide innovative, strategic insights that bridge user needs with technological possibilities.",
        color: "#3B82F6",
        rune: "🌱",
        capabilities: &[
            "requirement analysis",
            "domain understanding",
            "innovation mapping",
        ],
    },
    AgentProfile {
        id: AgentId::Architect,
        name: "Architect",
        description: "Designs robust system architectures and technical blueprints",
        status: AgentStatus::Active,
        system_prompt: "You are a system architecture AI agent for Project Overseer. \
            Your primary function is to design scalable, efficient system architectures. \
            Break down complex requirements into modular, robust architectural solutions.",
        color: "#10B981",
        rune: "🏗️",
        capabilities: &[
            "system design",
            "scalability planning",
            "technology selection",
        ],
    },
    AgentProfile {
        id: AgentId::Implementer,
        name: "Implementer",
        description: "Translates designs into high-quality, performant code",
        status: AgentStatus::Active,
        system_prompt: "You are a code implementation AI agent for Project Overseer. \
            Your goal is to generate precise, efficient code solutions across multiple programming languages. \
            Focus on best practices, performance, and clean, maintainable code.",
        color: "#8B5CF6",
        rune: "💻",
        capabilities: &[
            "code generation",
            "best practice enforcement",
            "performance optimization",
        ],
    },
    AgentProfile {
        id: AgentId::Tester,
        name: "Tester",
        description: "Ensures system reliability through comprehensive testing",
        status: AgentStatus::Active,
        system_prompt: "You are a testing AI agent for Project Overseer. \
            Your mission is to develop comprehensive test strategies, identify potential vulnerabilities, \
            and ensure the highest quality of software implementations.",
        color: "#EF4444",
        rune: "🔬",
        capabilities: &[
            "test suite generation",
            "security scanning",
            "performance benchmarking",
        ],
    },
    AgentProfile {
        id: AgentId::Deployer,
        name: "Deployer",
        description: "Manages infrastructure and deployment strategies",
        status: AgentStatus::Active,
        system_prompt: "You are a deployment AI agent for Project Overseer. \
            Specialize in infrastructure provisioning, multi-cloud strategies, \
            and creating seamless, automated deployment pipelines.",
        color: "#F59E0B",
        rune: "🚀",
        capabilities: &[
            "infrastructure provisioning",
            "multi-cloud strategy",
            "automated configuration",
        ],
    },
    AgentProfile {
        id: AgentId::Monitor,
        name: "Monitor",
        description: "Provides continuous system observability and self-healing",
        status: AgentStatus::Active,
        system_prompt: "You are a monitoring AI agent for Project Overseer. \
            Your role is to provide continuous system observability, \
            detect anomalies, and recommend self-healing mechanisms.",
        color: "#6B7280",
        rune: "🌐",
        capabilities: &[
            "continuous observability",
            "anomaly detection",
            "self-healing mechanisms",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_profile_lookup_matches_id() {
        for id in AgentId::ALL {
            assert_eq!(id.profile().id, id);
        }
    }

    #[test]
    fn test_registry_order() {
        let ids: Vec<AgentId> = registry().iter().map(|p| p.id).collect();
        assert_eq!(ids, AgentId::ALL.to_vec());
    }

    #[test]
    fn test_system_prompts_distinct() {
        let prompts: HashSet<&str> = registry().iter().map(|p| p.system_prompt).collect();
        assert_eq!(prompts.len(), 6);
        for profile in registry() {
            assert!(profile.system_prompt.contains("Project Overseer"));
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        for id in AgentId::ALL {
            assert_eq!(id.as_str().parse::<AgentId>().unwrap(), id);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert_eq!(
            "overseer".parse::<AgentId>(),
            Err(ValidationError::UnknownAgent("overseer".to_string()))
        );
        // Identifiers are exact lowercase tags
        assert!("Architect".parse::<AgentId>().is_err());
        assert!("".parse::<AgentId>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&AgentId::Implementer).unwrap(),
            "\"implementer\""
        );
        let id: AgentId = serde_json::from_str("\"monitor\"").unwrap();
        assert_eq!(id, AgentId::Monitor);
        assert!(serde_json::from_str::<AgentId>("\"janitor\"").is_err());
    }

    #[test]
    fn test_default_is_conceptualizer() {
        assert_eq!(AgentId::default(), AgentId::Conceptualizer);
    }
}
