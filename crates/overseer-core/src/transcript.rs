//! In-memory conversation transcript for one chat session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::AgentId;
use crate::types::{ChatRequest, ChatResult};

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// One line of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Replying agent on agent entries, addressed agent on user entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn from_request(request: &ChatRequest) -> Self {
        Self {
            id: format!("user-{}", uuid::Uuid::new_v4()),
            text: request.message().to_string(),
            sender: Sender::User,
            agent: Some(request.agent()),
            timestamp: Utc::now(),
        }
    }

    /// Agent reply; a failed result contributes its error text
    pub fn from_result(result: &ChatResult) -> Self {
        Self {
            id: format!("agent-{}", uuid::Uuid::new_v4()),
            text: result.message.clone(),
            sender: Sender::Agent,
            agent: Some(result.agent),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, append-only list of entries. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, request: &ChatRequest) -> TranscriptEntry {
        self.push(TranscriptEntry::from_request(request))
    }

    pub fn record_result(&mut self, result: &ChatResult) -> TranscriptEntry {
        self.push(TranscriptEntry::from_result(result))
    }

    fn push(&mut self, entry: TranscriptEntry) -> TranscriptEntry {
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries exchanged with a single agent, in order
    pub fn for_agent(&self, agent: AgentId) -> Vec<TranscriptEntry> {
        self.entries
            .iter()
            .filter(|e| e.agent == Some(agent))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
