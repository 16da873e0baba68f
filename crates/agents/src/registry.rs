//! The closed table of specialist agents.
//!
//! The set of agents is fixed at compile time. [`AgentId`] is the closed
//! enum of identifiers and the registry maps every variant to its
//! descriptor, so a lookup by id can never miss.

use crate::personas::{
    ASSISTANT_SYSTEM_PROMPT, LEADS_SYSTEM_PROMPT, PERFORMANCE_SYSTEM_PROMPT,
    RECRUITMENT_SYSTEM_PROMPT, SELL_SYSTEM_PROMPT,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Identifier of one of the five specialist agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Recruitment,
    Leads,
    Sell,
    Performance,
    /// Catch-all for scheduling, general and multi-topic requests
    Assistant,
}

impl AgentId {
    pub const ALL: [AgentId; 5] = [
        AgentId::Recruitment,
        AgentId::Leads,
        AgentId::Sell,
        AgentId::Performance,
        AgentId::Assistant,
    ];

    pub const CATCH_ALL: AgentId = AgentId::Assistant;

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Recruitment => "recruitment",
            AgentId::Leads => "leads",
            AgentId::Sell => "sell",
            AgentId::Performance => "performance",
            AgentId::Assistant => "assistant",
        }
    }

    /// Exact, case-sensitive match against the canonical ids.
    pub fn parse(s: &str) -> Option<AgentId> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = agentdesk_common::AgentDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::parse(s).ok_or_else(|| agentdesk_common::AgentDeskError::UnknownAgent(s.into()))
    }
}

/// Static descriptor of an agent persona.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: &'static str,
    pub role: &'static str,
    pub system_prompt: &'static str,
    pub capabilities: &'static [&'static str],
    /// Accent color used by dashboards
    pub color: &'static str,
    pub active: bool,
}

fn descriptor(id: AgentId) -> Agent {
    match id {
        AgentId::Recruitment => Agent {
            id,
            name: "Recruitment Agent",
            role: "Talent acquisition and onboarding",
            system_prompt: RECRUITMENT_SYSTEM_PROMPT,
            capabilities: &[
                "Candidate assessment",
                "Interview preparation",
                "Onboarding plans",
                "Pipeline analysis",
            ],
            color: "#8b5cf6",
            active: true,
        },
        AgentId::Leads => Agent {
            id,
            name: "Lead Management Agent",
            role: "Lead prioritization and nurturing",
            system_prompt: LEADS_SYSTEM_PROMPT,
            capabilities: &[
                "Lead scoring",
                "Follow-up planning",
                "Nurture sequences",
                "Conversion analysis",
            ],
            color: "#3b82f6",
            active: true,
        },
        AgentId::Sell => Agent {
            id,
            name: "Sales Agent",
            role: "Customer coverage and product recommendations",
            system_prompt: SELL_SYSTEM_PROMPT,
            capabilities: &[
                "Protection gap analysis",
                "Product recommendations",
                "Cross-sell opportunities",
                "Sales talking points",
            ],
            color: "#10b981",
            active: true,
        },
        AgentId::Performance => Agent {
            id,
            name: "Performance Coach",
            role: "Sales performance and coaching",
            system_prompt: PERFORMANCE_SYSTEM_PROMPT,
            capabilities: &[
                "Target tracking",
                "Commission analysis",
                "Forecasting",
                "Coaching plans",
            ],
            color: "#f59e0b",
            active: true,
        },
        AgentId::Assistant => Agent {
            id,
            name: "Personal Assistant",
            role: "Scheduling and general questions",
            system_prompt: ASSISTANT_SYSTEM_PROMPT,
            capabilities: &[
                "Scheduling",
                "Meeting preparation",
                "General questions",
                "Cross-domain summaries",
            ],
            color: "#6b7280",
            active: true,
        },
    }
}

static REGISTRY: LazyLock<AgentRegistry> = LazyLock::new(AgentRegistry::build);

/// Immutable id to descriptor table.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Agent>,
}

impl AgentRegistry {
    fn build() -> Self {
        let agents = AgentId::ALL
            .into_iter()
            .map(|id| (id, descriptor(id)))
            .collect();
        Self { agents }
    }

    /// The process-wide registry.
    pub fn global() -> &'static AgentRegistry {
        &REGISTRY
    }

    pub fn get(&self, id: AgentId) -> &Agent {
        &self.agents[&id]
    }

    /// Lookup by raw id string; `None` for anything outside the closed set.
    pub fn lookup(&self, id: &str) -> Option<&Agent> {
        AgentId::parse(id).map(|id| self.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        AgentId::parse(id).is_some()
    }

    /// All agents in canonical order.
    pub fn all(&self) -> Vec<&Agent> {
        AgentId::ALL.iter().map(|id| self.get(*id)).collect()
    }

    pub fn ids(&self) -> [AgentId; 5] {
        AgentId::ALL
    }
}
