//! Domain records used to ground agent answers.
//!
//! The records themselves are owned by an external collaborator; the core
//! only asks a [`DataSource`] for a location-scoped [`DomainSnapshot`] and
//! renders it into the grounding prompt.

use crate::{AgentDeskError, Location, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// A recruitment candidate in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Pipeline stage, e.g. "screening", "interview", "onboarding"
    pub stage: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
}

/// A sales lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Conversion likelihood (0 - 100)
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub interest: Option<String>,
}

/// An existing policyholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub policies: Vec<String>,
    /// Uncovered amount, in local currency
    #[serde(default)]
    pub protection_gap: Option<u64>,
}

/// An agency employee (sales agent), not to be confused with an AI agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub monthly_sales: u64,
    #[serde(default)]
    pub monthly_target: u64,
    #[serde(default)]
    pub commission: u64,
}

impl AgentProfile {
    /// Progress against target as a percentage; 0 when no target is set.
    pub fn target_progress(&self) -> u64 {
        if self.monthly_target == 0 {
            0
        } else {
            self.monthly_sales * 100 / self.monthly_target
        }
    }
}

/// Read-only records for one location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSnapshot {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub agents: Vec<AgentProfile>,
}

impl DomainSnapshot {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
            && self.leads.is_empty()
            && self.customers.is_empty()
            && self.agents.is_empty()
    }

    /// Render the snapshot as the text block injected into grounding prompts.
    pub fn format_for_prompt(&self, location: Location) -> String {
        let mut out = format!("=== {} DATA ===\n", location.display_name().to_uppercase());

        if self.is_empty() {
            out.push_str("No records available for this location.\n");
            return out;
        }

        if !self.candidates.is_empty() {
            out.push_str("\nCANDIDATES:\n");
            for c in &self.candidates {
                let _ = write!(out, "- {} ({}): stage={}", c.id, c.name, c.stage);
                if let Some(source) = &c.source {
                    let _ = write!(out, ", source={source}");
                }
                if let Some(score) = c.score {
                    let _ = write!(out, ", score={score}");
                }
                out.push('\n');
            }
        }

        if !self.leads.is_empty() {
            out.push_str("\nLEADS:\n");
            for l in &self.leads {
                let _ = write!(out, "- {} ({}): status={}, score={}", l.id, l.name, l.status, l.score);
                if let Some(interest) = &l.interest {
                    let _ = write!(out, ", interest={interest}");
                }
                out.push('\n');
            }
        }

        if !self.customers.is_empty() {
            out.push_str("\nCUSTOMERS:\n");
            for c in &self.customers {
                let policies = if c.policies.is_empty() {
                    "none".to_string()
                } else {
                    c.policies.join(", ")
                };
                let _ = write!(out, "- {} ({}): policies=[{}]", c.id, c.name, policies);
                if let Some(gap) = c.protection_gap {
                    let _ = write!(out, ", protection_gap={gap}");
                }
                out.push('\n');
            }
        }

        if !self.agents.is_empty() {
            out.push_str("\nAGENTS:\n");
            for a in &self.agents {
                let _ = writeln!(
                    out,
                    "- {} ({}): sales={}, target={} ({}%), commission={}",
                    a.id,
                    a.name,
                    a.monthly_sales,
                    a.monthly_target,
                    a.target_progress(),
                    a.commission
                );
            }
        }

        out
    }
}

/// Supplies domain records for a location.
pub trait DataSource: Send + Sync {
    fn snapshot(&self, location: Location) -> DomainSnapshot;
}

/// In-memory data source, optionally loaded from a JSON file keyed by location.
///
/// ```json
/// { "malaysia": { "leads": [ ... ] }, "singapore": { ... } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDataSource {
    snapshots: HashMap<Location, DomainSnapshot>,
}

impl StaticDataSource {
    pub fn new(snapshots: HashMap<Location, DomainSnapshot>) -> Self {
        Self { snapshots }
    }

    pub fn with_snapshot(mut self, location: Location, snapshot: DomainSnapshot) -> Self {
        self.snapshots.insert(location, snapshot);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshots: HashMap<Location, DomainSnapshot> = serde_json::from_str(json)?;
        Ok(Self { snapshots })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentDeskError::Config(format!("Failed to read data file '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
    }
}

impl DataSource for StaticDataSource {
    fn snapshot(&self, location: Location) -> DomainSnapshot {
        self.snapshots.get(&location).cloned().unwrap_or_default()
    }
}
