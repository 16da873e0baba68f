//! Routing decision types.

use agentdesk_agents::AgentId;
use serde::{Deserialize, Serialize};

/// Which agent (or agent sequence) should answer a query.
///
/// `selected_agent` is always a registry id; sanitization guarantees it
/// whatever the model returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorDecision {
    pub selected_agent: AgentId,
    pub reasoning: String,
    /// 0.0 - 1.0
    pub confidence: f32,
    #[serde(default)]
    pub requires_multiple_agents: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_sequence: Option<Vec<AgentId>>,
}

impl OrchestratorDecision {
    /// Single-agent decision.
    pub fn single(agent: AgentId, reasoning: impl Into<String>, confidence: f32) -> Self {
        Self {
            selected_agent: agent,
            reasoning: reasoning.into(),
            confidence,
            requires_multiple_agents: false,
            agent_sequence: None,
        }
    }

    /// The agents to run as a workflow, if the decision asks for one.
    pub fn workflow_sequence(&self) -> Option<&[AgentId]> {
        match &self.agent_sequence {
            Some(sequence) if self.requires_multiple_agents && !sequence.is_empty() => {
                Some(sequence)
            }
            _ => None,
        }
    }
}

/// A routing decision exactly as the model wrote it, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDecision {
    #[serde(default)]
    pub selected_agent: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Kept loose: models sometimes write `"high"` or `"0.8"`
    #[serde(default)]
    pub confidence: Option<serde_json::Value>,
    #[serde(default)]
    pub requires_multiple_agents: Option<serde_json::Value>,
    #[serde(default)]
    pub agent_sequence: Option<Vec<String>>,
}
