//! Single-agent execution.

use crate::output::{clean_response, contains_routing_json};
use crate::prompt::build_grounded_prompt;
use crate::registry::{Agent, AgentRegistry};
use agentdesk_common::{AgentContext, AgentDeskError, DataSource, Result};
use agentdesk_llm::{ChunkSink, LlmClient, LlmRequest};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs one agent persona against the shared model backend.
pub struct AgentExecutor {
    llm: Arc<dyn LlmClient>,
    data: Arc<dyn DataSource>,
    max_tokens: Option<u32>,
}

impl AgentExecutor {
    pub fn new(llm: Arc<dyn LlmClient>, data: Arc<dyn DataSource>) -> Self {
        Self {
            llm,
            data,
            max_tokens: None,
        }
    }

    /// Bound agent replies; the gateway default applies otherwise.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Resolve an agent id, failing with [`AgentDeskError::UnknownAgent`].
    pub fn resolve(agent_id: &str) -> Result<&'static Agent> {
        AgentRegistry::global()
            .lookup(agent_id)
            .ok_or_else(|| AgentDeskError::UnknownAgent(agent_id.to_string()))
    }

    fn build_request(&self, agent: &Agent, query: &str, context: &AgentContext) -> LlmRequest {
        let snapshot = self.data.snapshot(context.location);
        let prompt = build_grounded_prompt(agent, query, context, &snapshot);

        let request = LlmRequest::prompt(prompt).with_system_prompt(agent.system_prompt);
        match self.max_tokens {
            Some(max_tokens) => request.with_max_tokens(max_tokens),
            None => request,
        }
    }

    /// Execute `agent_id` on `query`.
    ///
    /// With `on_chunk` set, every delta is forwarded as it arrives and the raw
    /// accumulated text is returned. Without it, the complete reply is cleaned
    /// of routing artifacts before it is returned.
    pub async fn execute(
        &self,
        agent_id: &str,
        query: &str,
        context: &AgentContext,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<String> {
        let agent = Self::resolve(agent_id)?;
        let request = self.build_request(agent, query, context);

        info!(
            agent = %agent.id,
            location = %context.location,
            streaming = on_chunk.is_some(),
            history = context.conversation_history.len(),
            "Executing agent"
        );

        match on_chunk {
            Some(sink) => {
                let mut accumulated = String::new();
                let mut forward = |chunk: &str| {
                    accumulated.push_str(chunk);
                    sink(chunk);
                };
                self.llm.stream(request, &mut forward).await?;

                if contains_routing_json(&accumulated) {
                    warn!(agent = %agent.id, "Streamed reply contains routing JSON");
                }
                debug!(agent = %agent.id, len = accumulated.len(), "Agent stream finished");
                Ok(accumulated)
            }
            None => {
                let response = self.llm.complete(request).await?;
                let cleaned = clean_response(&response.content);
                debug!(
                    agent = %agent.id,
                    raw_len = response.content.len(),
                    cleaned_len = cleaned.len(),
                    "Agent reply cleaned"
                );
                Ok(cleaned)
            }
        }
    }
}
