//! Conversation turns exchanged between the user and agents.

use serde::{Deserialize, Serialize};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    /// Unique message ID
    pub id: String,

    /// Agent that produced or received the turn
    pub agent_id: String,

    /// Display name of that agent
    pub agent_name: String,

    pub role: MessageRole,

    pub content: String,

    /// Timestamp (Unix millis)
    pub timestamp: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl AgentMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: "user".into(),
            agent_name: "User".into(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: now_millis(),
            metadata: None,
        }
    }

    pub fn from_agent(
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: now_millis(),
            metadata: None,
        }
    }
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
