//! Sequential multi-agent workflows.
//!
//! Agents run strictly one after another. Each step sees the original query
//! plus every earlier step's output, appended as a labeled block:
//!
//! ```text
//! <query>
//!
//! [leads Analysis]: <leads output>
//!
//! [sell Analysis]: <sell output>
//! ```
//!
//! The first failing step aborts the whole run and its error is returned.

use crate::executor::AgentExecutor;
use crate::registry::AgentId;
use agentdesk_common::{AgentContext, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Progress notifications for a running workflow.
pub trait WorkflowHooks: Send + Sync {
    fn on_agent_start(&self, _index: usize, _agent: AgentId) {}

    fn on_agent_complete(&self, _index: usize, _agent: AgentId, _output: &str) {}
}

/// Hooks that ignore every event.
pub struct NoopHooks;

impl WorkflowHooks for NoopHooks {}

/// One completed step.
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub agent_id: AgentId,
    pub output: String,
    pub duration_ms: u64,
}

/// Result of a workflow run.
#[derive(Debug, Clone, Default)]
pub struct WorkflowResult {
    /// Steps in execution order
    pub steps: Vec<WorkflowStep>,
    /// Query plus every labeled step output
    pub final_context: String,
    pub duration_ms: u64,
}

impl WorkflowResult {
    /// Outputs keyed by agent. An agent that ran twice keeps its last output.
    pub fn by_agent(&self) -> HashMap<AgentId, String> {
        self.steps
            .iter()
            .map(|step| (step.agent_id, step.output.clone()))
            .collect()
    }

    /// Output of the last step, if any ran.
    pub fn final_output(&self) -> Option<&str> {
        self.steps.last().map(|step| step.output.as_str())
    }
}

/// Append a step's output to the accumulated context.
pub fn append_analysis(accumulated: &str, agent: AgentId, output: &str) -> String {
    format!("{accumulated}\n\n[{agent} Analysis]: {output}")
}

/// Runs agent sequences on a shared executor.
#[derive(Clone)]
pub struct WorkflowRunner {
    executor: Arc<AgentExecutor>,
}

impl WorkflowRunner {
    pub fn new(executor: Arc<AgentExecutor>) -> Self {
        Self { executor }
    }

    /// Run `sequence` over `query`.
    ///
    /// Every id is resolved before the first step, so an unknown id fails the
    /// run without any model call.
    pub async fn run(
        &self,
        sequence: &[String],
        query: &str,
        context: &AgentContext,
        hooks: &dyn WorkflowHooks,
    ) -> Result<WorkflowResult> {
        let agents = sequence
            .iter()
            .map(|id| AgentExecutor::resolve(id).map(|agent| agent.id))
            .collect::<Result<Vec<_>>>()?;
        self.run_agents(&agents, query, context, hooks).await
    }

    /// Run an already validated sequence.
    pub async fn run_agents(
        &self,
        agents: &[AgentId],
        query: &str,
        context: &AgentContext,
        hooks: &dyn WorkflowHooks,
    ) -> Result<WorkflowResult> {
        let start_time = Instant::now();

        info!(
            agent_count = agents.len(),
            sequence = ?agents.iter().map(AgentId::as_str).collect::<Vec<_>>(),
            "Starting sequential workflow"
        );

        if agents.is_empty() {
            warn!("Workflow has no agents");
        }

        let mut accumulated = query.to_string();
        let mut steps = Vec::with_capacity(agents.len());

        for (index, &agent) in agents.iter().enumerate() {
            let step_start = Instant::now();
            hooks.on_agent_start(index, agent);

            let output = self
                .executor
                .execute(agent.as_str(), &accumulated, context, None)
                .await
                .inspect_err(|e| {
                    warn!(step = index + 1, agent = %agent, error = %e, "Workflow step failed");
                })?;

            hooks.on_agent_complete(index, agent, &output);
            debug!(step = index + 1, agent = %agent, output_len = output.len(), "Step completed");

            accumulated = append_analysis(&accumulated, agent, &output);
            steps.push(WorkflowStep {
                agent_id: agent,
                output,
                duration_ms: step_start.elapsed().as_millis() as u64,
            });
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(steps = steps.len(), duration_ms, "Workflow completed");

        Ok(WorkflowResult {
            steps,
            final_context: accumulated,
            duration_ms,
        })
    }
}
