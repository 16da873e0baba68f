//! Per-request context passed into routing and execution.

use crate::AgentMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market the request is scoped to. Domain data is partitioned by it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Malaysia,
    Singapore,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Malaysia => "malaysia",
            Location::Singapore => "singapore",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Location::Malaysia => "Malaysia",
            Location::Singapore => "Singapore",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the core knows about the caller for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContext {
    #[serde(default)]
    pub location: Location,

    /// Prior turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<AgentMessage>,

    /// Page-specific data the caller wants the agent to see
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_data: Option<serde_json::Value>,
}

impl AgentContext {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<AgentMessage>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_current_data(mut self, data: serde_json::Value) -> Self {
        self.current_data = Some(data);
        self
    }

    /// The last `n` turns, oldest first.
    pub fn recent_history(&self, n: usize) -> &[AgentMessage] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }
}
