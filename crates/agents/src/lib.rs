//! Specialist agents for the AgentDesk orchestrator.
//!
//! - **Registry**: the closed table of five personas
//! - **Executor**: grounds a query in domain data and runs one persona
//! - **Workflow**: chains personas, feeding each one the earlier outputs
//!
//! ```text
//! query ──► AgentExecutor ──► LlmClient
//!              │    ▲
//!              │    └── DataSource snapshot + recent history
//!              ▼
//!         clean_response (non-streaming only)
//! ```

pub mod executor;
pub mod output;
pub mod personas;
pub mod prompt;
pub mod registry;
pub mod workflow;

pub use executor::AgentExecutor;
pub use output::{
    clean_response, contains_routing_json, extract_json_object, extract_routing_object,
};
pub use prompt::{HISTORY_WINDOW, build_grounded_prompt};
pub use registry::{Agent, AgentId, AgentRegistry};
pub use workflow::{NoopHooks, WorkflowHooks, WorkflowResult, WorkflowRunner, WorkflowStep};
