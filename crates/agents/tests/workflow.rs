//! Integration tests for agent execution and sequential workflows.
//!
//! A persona-aware mock stands in for the model backend, so these tests
//! verify prompt flow between steps without any network access.

use agentdesk_agents::{AgentExecutor, AgentId, AgentRegistry, WorkflowHooks, WorkflowRunner};
use agentdesk_common::{
    AgentContext, AgentDeskError, Customer, DomainSnapshot, Lead, Location, Result,
    StaticDataSource,
};
use agentdesk_llm::{ChunkSink, LlmClient, LlmRequest, LlmResponse};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Answers as whichever persona the system prompt belongs to.
#[derive(Default)]
struct PersonaLlm {
    calls: Mutex<Vec<(AgentId, String)>>,
    fail_for: Option<AgentId>,
}

impl PersonaLlm {
    fn failing_for(agent: AgentId) -> Self {
        Self {
            fail_for: Some(agent),
            ..Default::default()
        }
    }

    fn persona(request: &LlmRequest) -> AgentId {
        let system = request.system_prompt.as_deref().unwrap_or_default();
        AgentRegistry::global()
            .all()
            .into_iter()
            .find(|agent| agent.system_prompt == system)
            .map(|agent| agent.id)
            .expect("request carries a registered persona")
    }

    fn answer(&self, request: &LlmRequest) -> Result<String> {
        let agent = Self::persona(request);
        let prompt = request.messages[0].content.clone();
        self.calls.lock().unwrap().push((agent, prompt));

        if self.fail_for == Some(agent) {
            return Err(AgentDeskError::Backend {
                status: 529,
                body: "overloaded".into(),
            });
        }
        Ok(format!("{agent} recommends calling L-102 first"))
    }

    fn calls(&self) -> Vec<(AgentId, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for PersonaLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let content = self.answer(&request)?;
        Ok(LlmResponse {
            content,
            model: "persona".into(),
            usage: None,
            finish_reason: Some("end_turn".into()),
        })
    }

    async fn stream(&self, request: LlmRequest, on_chunk: ChunkSink<'_>) -> Result<LlmResponse> {
        let content = self.answer(&request)?;
        for word in content.split_inclusive(' ') {
            on_chunk(word);
        }
        Ok(LlmResponse {
            content,
            model: "persona".into(),
            usage: None,
            finish_reason: Some("end_turn".into()),
        })
    }

    fn model_name(&self) -> &str {
        "persona"
    }
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl WorkflowHooks for RecordingHooks {
    fn on_agent_start(&self, index: usize, agent: AgentId) {
        self.events.lock().unwrap().push(format!("start {index} {agent}"));
    }

    fn on_agent_complete(&self, index: usize, agent: AgentId, output: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete {index} {agent}: {output}"));
    }
}

fn data() -> Arc<StaticDataSource> {
    let malaysia = DomainSnapshot {
        leads: vec![Lead {
            id: "L-102".into(),
            name: "Aisyah".into(),
            status: "warm".into(),
            score: 82,
            interest: None,
        }],
        customers: vec![Customer {
            id: "CU-7".into(),
            name: "Tan".into(),
            policies: vec!["term life".into()],
            protection_gap: Some(250_000),
        }],
        ..Default::default()
    };
    Arc::new(StaticDataSource::default().with_snapshot(Location::Malaysia, malaysia))
}

fn runner(llm: Arc<PersonaLlm>) -> WorkflowRunner {
    WorkflowRunner::new(Arc::new(AgentExecutor::new(llm, data())))
}

fn seq(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn leads_then_sell_feeds_context_forward() {
    let llm = Arc::new(PersonaLlm::default());
    let result = runner(llm.clone())
        .run(&seq(&["leads", "sell"]), "Q", &AgentContext::default(), &agentdesk_agents::NoopHooks)
        .await
        .unwrap();

    let by_agent = result.by_agent();
    assert_eq!(by_agent.len(), 2);
    let leads_output = &by_agent[&AgentId::Leads];
    assert_eq!(leads_output, "leads recommends calling L-102 first");

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, AgentId::Leads);
    assert_eq!(calls[1].0, AgentId::Sell);
    assert!(!calls[0].1.contains("Analysis]"));
    assert!(calls[1].1.contains(&format!("[leads Analysis]: {leads_output}")));

    assert!(result.final_context.starts_with("Q\n\n[leads Analysis]: "));
    assert!(
        result
            .final_context
            .ends_with("[sell Analysis]: sell recommends calling L-102 first")
    );
}

#[tokio::test]
async fn every_step_is_grounded_in_location_data() {
    let llm = Arc::new(PersonaLlm::default());
    runner(llm.clone())
        .run(
            &seq(&["leads", "sell"]),
            "Who should I call?",
            &AgentContext::new(Location::Malaysia),
            &agentdesk_agents::NoopHooks,
        )
        .await
        .unwrap();

    for (_, prompt) in llm.calls() {
        assert!(prompt.contains("=== MALAYSIA DATA ==="));
        assert!(prompt.contains("L-102"));
        assert!(prompt.contains("CU-7"));
        assert!(prompt.contains("Who should I call?"));
    }
}

#[tokio::test]
async fn hooks_fire_in_order() {
    let llm = Arc::new(PersonaLlm::default());
    let hooks = RecordingHooks::default();
    runner(llm)
        .run(&seq(&["recruitment", "performance"]), "Q", &AgentContext::default(), &hooks)
        .await
        .unwrap();

    let events = hooks.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 0 recruitment",
            "complete 0 recruitment: recruitment recommends calling L-102 first",
            "start 1 performance",
            "complete 1 performance: performance recommends calling L-102 first",
        ]
    );
}

#[tokio::test]
async fn failing_step_aborts_the_workflow() {
    let llm = Arc::new(PersonaLlm::failing_for(AgentId::Sell));
    let hooks = RecordingHooks::default();
    let err = runner(llm.clone())
        .run(&seq(&["leads", "sell", "performance"]), "Q", &AgentContext::default(), &hooks)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentDeskError::Backend { status: 529, .. }));
    let agents: Vec<_> = llm.calls().into_iter().map(|(agent, _)| agent).collect();
    assert_eq!(agents, vec![AgentId::Leads, AgentId::Sell]);

    let events = hooks.events.lock().unwrap().clone();
    assert_eq!(events.last().map(String::as_str), Some("start 1 sell"));
}

#[tokio::test]
async fn unknown_id_fails_before_any_call() {
    let llm = Arc::new(PersonaLlm::default());
    let err = runner(llm.clone())
        .run(&seq(&["leads", "marketing"]), "Q", &AgentContext::default(), &agentdesk_agents::NoopHooks)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentDeskError::UnknownAgent(ref id) if id == "marketing"));
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn empty_sequence_returns_empty_result() {
    let llm = Arc::new(PersonaLlm::default());
    let result = runner(llm.clone())
        .run(&[], "Q", &AgentContext::default(), &agentdesk_agents::NoopHooks)
        .await
        .unwrap();

    assert!(result.steps.is_empty());
    assert_eq!(result.final_context, "Q");
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn streaming_and_non_streaming_agree() {
    let llm = Arc::new(PersonaLlm::default());
    let executor = AgentExecutor::new(llm.clone(), data());
    let context = AgentContext::default();

    let plain = executor.execute("assistant", "Plan my day", &context, None).await.unwrap();

    let mut chunks = Vec::new();
    let mut sink = |chunk: &str| chunks.push(chunk.to_string());
    let streamed = executor
        .execute("assistant", "Plan my day", &context, Some(&mut sink))
        .await
        .unwrap();

    assert_eq!(plain, streamed);
    assert_eq!(chunks.concat(), streamed);
    assert_eq!(chunks.len(), 5);
    assert_eq!(llm.calls().len(), 2);
}
