//! Session management: each connected chat page owns one session and its transcript
//!
//! Sessions exist only while their WebSocket is open; closing or reloading the
//! page drops the transcript with it.

use chrono::{DateTime, Utc};
use overseer_core::{AgentId, ChatRequest, ChatResult, Transcript, TranscriptEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Summary of a single chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: u64,
}

struct SessionState {
    info: Session,
    transcript: Transcript,
}

/// Manages all live sessions
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a new session with an empty transcript
    pub async fn create(&self) -> Session {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let info = Session {
            id: id.clone(),
            created_at: now,
            last_activity: now,
            message_count: 0,
        };
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            SessionState {
                info: info.clone(),
                transcript: Transcript::new(),
            },
        );
        info!("Opened session {}", id);
        info
    }

    /// Drop a session and its transcript
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        if let Some(state) = &removed {
            info!(
                "Closed session {} ({} transcript entries)",
                id,
                state.transcript.len()
            );
        }
        removed.is_some()
    }

    /// Summary of one session, if it is still open
    pub async fn get(&self, id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(id).map(|s| s.info.clone())
    }

    /// Append the user's message. Returns `None` if the session is gone.
    pub async fn record_request(
        &self,
        session_id: &str,
        request: &ChatRequest,
    ) -> Option<TranscriptEntry> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.get_mut(session_id)?;
        state.info.last_activity = Utc::now();
        state.info.message_count += 1;
        debug!(
            "Session '{}' activity (messages: {})",
            session_id, state.info.message_count
        );
        Some(state.transcript.record_request(request))
    }

    /// Append the agent's reply. Returns `None` if the session closed while
    /// the request was in flight.
    pub async fn record_result(
        &self,
        session_id: &str,
        result: &ChatResult,
    ) -> Option<TranscriptEntry> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.get_mut(session_id)?;
        state.info.last_activity = Utc::now();
        state.info.message_count += 1;
        Some(state.transcript.record_result(result))
    }

    /// Transcript entries, optionally narrowed to one agent
    pub async fn transcript(
        &self,
        session_id: &str,
        agent: Option<AgentId>,
    ) -> Option<Vec<TranscriptEntry>> {
        let sessions = self.sessions.read().await;
        let state = sessions.get(session_id)?;
        Some(match agent {
            Some(agent) => state.transcript.for_agent(agent),
            None => state.transcript.entries().to_vec(),
        })
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
