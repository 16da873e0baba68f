//! Core coordinator: routing plus single and multi-agent execution.

use crate::config::{CoordinatorConfig, DEFAULT_ROUTING_MAX_TOKENS};
use crate::llm_triage::LlmRouter;
use crate::routing::OrchestratorDecision;
use agentdesk_agents::{
    AgentExecutor, AgentId, NoopHooks, WorkflowHooks, WorkflowResult, WorkflowRunner,
};
use agentdesk_common::{AgentContext, DataSource, Result, StaticDataSource};
use agentdesk_llm::{ChunkSink, LlmClient, build_llm_client};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confidence reported for a keyword hit.
pub const KEYWORD_HIT_CONFIDENCE: f32 = 0.8;

/// Confidence reported when no keyword matched.
pub const KEYWORD_DEFAULT_CONFIDENCE: f32 = 0.6;

/// Keyword sets in priority order; the first set with a match wins.
const KEYWORD_ROUTES: &[(AgentId, &[&str])] = &[
    (AgentId::Recruitment, &["candidate", "recruit", "onboard", "interview"]),
    (AgentId::Leads, &["lead", "prospect", "conversion", "nurture"]),
    (
        AgentId::Sell,
        &["customer", "sell", "product", "coverage", "protection gap"],
    ),
    (
        AgentId::Performance,
        &["performance", "commission", "target", "coach", "forecast"],
    ),
];

/// Deterministic keyword routing, used when model routing fails.
pub fn keyword_triage(query: &str) -> OrchestratorDecision {
    let lower = query.to_lowercase();

    for (agent, keywords) in KEYWORD_ROUTES {
        if let Some(keyword) = keywords.iter().find(|k| lower.contains(*k)) {
            return OrchestratorDecision::single(
                *agent,
                format!("Keyword match: \"{keyword}\""),
                KEYWORD_HIT_CONFIDENCE,
            );
        }
    }

    OrchestratorDecision::single(
        AgentId::CATCH_ALL,
        "No domain keywords matched",
        KEYWORD_DEFAULT_CONFIDENCE,
    )
}

/// What [`Coordinator::process`] produced.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub decision: OrchestratorDecision,
    /// Final answer: the single agent's reply or the last workflow step's
    pub response: String,
    /// Set when the decision ran as a workflow
    pub workflow: Option<WorkflowResult>,
}

/// The main coordinator.
///
/// Holds one shared gateway for routing and execution. Every method takes
/// `&self`; there is no per-request state.
pub struct Coordinator {
    llm: Arc<dyn LlmClient>,
    router: LlmRouter,
    executor: Arc<AgentExecutor>,
    workflows: WorkflowRunner,
}

impl Coordinator {
    pub fn new(llm: Arc<dyn LlmClient>, data: Arc<dyn DataSource>) -> Self {
        let executor = Arc::new(AgentExecutor::new(llm.clone(), data));
        Self::with_executor(llm, executor, DEFAULT_ROUTING_MAX_TOKENS)
    }

    fn with_executor(
        llm: Arc<dyn LlmClient>,
        executor: Arc<AgentExecutor>,
        routing_max_tokens: u32,
    ) -> Self {
        Self {
            router: LlmRouter::new(llm.clone(), routing_max_tokens),
            workflows: WorkflowRunner::new(executor.clone()),
            executor,
            llm,
        }
    }

    /// Build the gateway and data source described by `config`.
    pub fn from_config(config: &CoordinatorConfig) -> Result<Self> {
        info!(model = %config.provider.llm.model, "Initializing AgentDesk coordinator");

        let llm = build_llm_client(&config.provider.llm);
        let data: Arc<dyn DataSource> = match &config.data_path {
            Some(path) => Arc::new(StaticDataSource::from_file(path)?),
            None => {
                warn!("No data_path configured, agents will answer without domain records");
                Arc::new(StaticDataSource::default())
            }
        };

        let executor = Arc::new(
            AgentExecutor::new(llm.clone(), data).with_max_tokens(config.provider.llm.max_tokens),
        );
        Ok(Self::with_executor(llm, executor, config.provider.routing_max_tokens))
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Decide which agent answers `query`.
    ///
    /// Never fails: any routing error falls back to [`keyword_triage`].
    pub async fn route(&self, query: &str, context: &AgentContext) -> OrchestratorDecision {
        info!(
            content_preview = %query.chars().take(50).collect::<String>(),
            location = %context.location,
            "Routing request"
        );

        match self.router.route(query, context).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    error = %e,
                    fatal = e.is_fatal(),
                    "Model triage failed, falling back to keyword triage"
                );
                let decision = keyword_triage(query);
                debug!(
                    agent = %decision.selected_agent,
                    confidence = decision.confidence,
                    "Keyword triage decision"
                );
                decision
            }
        }
    }

    /// Run one agent. See [`AgentExecutor::execute`].
    pub async fn execute(
        &self,
        agent_id: &str,
        query: &str,
        context: &AgentContext,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<String> {
        self.executor.execute(agent_id, query, context, on_chunk).await
    }

    /// Run an explicit agent sequence.
    pub async fn run_workflow(
        &self,
        sequence: &[String],
        query: &str,
        context: &AgentContext,
        hooks: &dyn WorkflowHooks,
    ) -> Result<WorkflowResult> {
        self.workflows.run(sequence, query, context, hooks).await
    }

    /// Route `query`, then run the decision.
    ///
    /// A decision asking for several agents with a non-empty sequence runs
    /// as a workflow; anything else runs the selected agent alone.
    pub async fn process(&self, query: &str, context: &AgentContext) -> Result<ProcessOutcome> {
        let decision = self.route(query, context).await;

        if let Some(sequence) = decision.workflow_sequence() {
            let result = self
                .workflows
                .run_agents(sequence, query, context, &NoopHooks)
                .await?;
            let response = result.final_output().unwrap_or_default().to_string();
            return Ok(ProcessOutcome {
                decision,
                response,
                workflow: Some(result),
            });
        }

        let response = self
            .executor
            .execute(decision.selected_agent.as_str(), query, context, None)
            .await?;
        Ok(ProcessOutcome {
            decision,
            response,
            workflow: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_priority_prefers_recruitment() {
        let decision = keyword_triage("Should this candidate get a raise on commission?");
        assert_eq!(decision.selected_agent, AgentId::Recruitment);
        assert_eq!(decision.confidence, KEYWORD_HIT_CONFIDENCE);
        assert!(!decision.requires_multiple_agents);
    }

    #[test]
    fn keyword_sets_route_to_each_specialist() {
        let cases = [
            ("Prepare interview questions", AgentId::Recruitment),
            ("Which prospects are cooling off?", AgentId::Leads),
            ("What product fits CU-7?", AgentId::Sell),
            ("Who has the biggest PROTECTION GAP?", AgentId::Sell),
            ("Forecast my month-end numbers", AgentId::Performance),
        ];
        for (query, expected) in cases {
            assert_eq!(keyword_triage(query).selected_agent, expected, "{query}");
        }
    }

    #[test]
    fn from_config_without_data_path() {
        let config = CoordinatorConfig::default();
        let coordinator = Coordinator::from_config(&config).unwrap();
        assert_eq!(coordinator.model_name(), config.provider.llm.model);
    }

    #[test]
    fn keyword_default_is_catch_all() {
        let decision = keyword_triage("Book lunch on Friday");
        assert_eq!(decision.selected_agent, AgentId::CATCH_ALL);
        assert_eq!(decision.confidence, KEYWORD_DEFAULT_CONFIDENCE);
    }
}
