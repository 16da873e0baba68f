//! Request routing and orchestration for AgentDesk.
//!
//! The coordinator is the central brain that:
//! 1. Receives a query with its caller context
//! 2. Asks the model which specialist should answer, falling back to
//!    keyword routing when that fails
//! 3. Runs the selected agent, or a sequence of agents as a workflow
//!
//! ```text
//! query
//!   │
//!   ▼
//! ┌──────────────┐  model triage ──✗──► keyword triage
//! │ Coordinator  │
//! └──────┬───────┘
//!        │ OrchestratorDecision
//!   ┌────┴──────────────┐
//!   ▼                   ▼
//! AgentExecutor   WorkflowRunner
//! ```

pub mod config;
pub mod llm_triage;
pub mod routing;
pub mod triage;

pub use config::{CoordinatorConfig, ProviderConfig};
pub use llm_triage::{DecisionParseError, LlmRouter, parse_decision, sanitize_decision};
pub use routing::{OrchestratorDecision, RawDecision};
pub use triage::{Coordinator, ProcessOutcome, keyword_triage};
