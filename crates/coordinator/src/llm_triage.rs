//! Model-based request routing.
//!
//! The model output is untrusted. Parsing runs in two stages:
//!
//! 1. [`parse_decision`] finds and decodes a JSON object, failing with a
//!    [`DecisionParseError`] when there is none.
//! 2. [`sanitize_decision`] forces the decoded fields into the closed agent
//!    set and the valid confidence range. It cannot fail.

use crate::routing::{OrchestratorDecision, RawDecision};
use agentdesk_agents::{AgentId, extract_routing_object};
use agentdesk_common::{AgentContext, AgentDeskError, MessageRole, Result};
use agentdesk_llm::{LlmClient, LlmRequest};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Confidence assumed when the model omits it.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Maximum characters of reasoning kept from the model.
const MAX_REASONING_LENGTH: usize = 500;

/// Prior turns shown to the router.
const ROUTING_HISTORY_WINDOW: usize = 3;

/// System prompt for the routing call.
const ROUTING_SYSTEM_PROMPT: &str = r#"You are the request router for an insurance agency's assistant desk.

Your job is to decide which specialist agent should answer the user's request.

IMPORTANT: Respond ONLY with a JSON object, no other text. The JSON must have this exact structure:

{
  "selectedAgent": "recruitment|leads|sell|performance|assistant",
  "reasoning": "brief explanation of your routing decision",
  "confidence": 0.0-1.0,
  "requiresMultipleAgents": false,
  "agentSequence": ["leads", "sell"]
}

Agent definitions:
- "recruitment": Candidates, recruiting, interviews, onboarding new agents
- "leads": Lead prioritization, prospects, follow-ups, conversion, nurturing
- "sell": Existing customers, products, coverage, protection gaps, cross-sell
- "performance": Sales targets, commission, coaching, forecasts
- "assistant": Scheduling, meetings, general questions, greetings, anything else

Rules:
- Scheduling, meeting, general and multi-topic requests always go to "assistant"
- When two specialists seem equally relevant and the request is not multi-step, use "assistant"
- Set "requiresMultipleAgents" to true ONLY when the request needs several specialists in order,
  and list them in "agentSequence" in the order they should run
- Omit "agentSequence" for single-agent requests
- "confidence" should reflect how certain you are (0.0 = guess, 1.0 = certain)

Examples:

User: "Which of my leads should I call first today?"
{"selectedAgent":"leads","reasoning":"Lead prioritization","confidence":0.92,"requiresMultipleAgents":false}

User: "Book a meeting with my team on Friday"
{"selectedAgent":"assistant","reasoning":"Scheduling request","confidence":0.95,"requiresMultipleAgents":false}

User: "Find my hottest leads and draft a product pitch for each"
{"selectedAgent":"leads","reasoning":"Lead ranking followed by product recommendations","confidence":0.8,"requiresMultipleAgents":true,"agentSequence":["leads","sell"]}"#;

/// Why a routing reply could not be decoded.
#[derive(Debug, Error, PartialEq)]
pub enum DecisionParseError {
    #[error("no JSON object in routing reply")]
    NoJson,

    #[error("routing reply is not a decision: {0}")]
    InvalidJson(String),
}

/// Stage one: locate and decode the decision object.
pub fn parse_decision(text: &str) -> std::result::Result<RawDecision, DecisionParseError> {
    let json = extract_routing_object(text).ok_or(DecisionParseError::NoJson)?;
    serde_json::from_str(json).map_err(|e| DecisionParseError::InvalidJson(e.to_string()))
}

/// Map a model-written id onto the closed set, `None` when it does not fit.
pub fn sanitize_agent_id(raw: &str) -> Option<AgentId> {
    let id = raw.trim().to_lowercase();
    if id.contains(char::is_whitespace) || id.contains('-') || id.contains("none") {
        return None;
    }
    AgentId::parse(&id)
}

/// Stage two: force a raw decision into a valid one.
///
/// Returns the decision and whether anything had to be corrected.
pub fn sanitize_decision(raw: RawDecision) -> (OrchestratorDecision, bool) {
    let mut corrected = false;

    let selected_agent = match raw.selected_agent.as_deref().and_then(sanitize_agent_id) {
        Some(id) => id,
        None => {
            warn!(
                selected_agent = ?raw.selected_agent,
                fallback = %AgentId::CATCH_ALL,
                "Invalid agent in routing reply"
            );
            corrected = true;
            AgentId::CATCH_ALL
        }
    };

    let confidence = match raw.confidence.as_ref().map(numeric_value) {
        Some(Some(c)) if c.is_finite() => {
            let clamped = c.clamp(0.0, 1.0);
            corrected |= clamped != c;
            clamped as f32
        }
        Some(_) => {
            corrected = true;
            DEFAULT_CONFIDENCE
        }
        None => DEFAULT_CONFIDENCE,
    };

    let requires_multiple_agents = match raw.requires_multiple_agents {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(flag)) if flag.trim().eq_ignore_ascii_case("true") => true,
        Some(Value::Null) | None => false,
        Some(_) => {
            corrected = true;
            false
        }
    };

    let agent_sequence = raw.agent_sequence.and_then(|ids| {
        let valid: Vec<AgentId> = ids.iter().filter_map(|id| sanitize_agent_id(id)).collect();
        if valid.len() != ids.len() {
            warn!(dropped = ids.len() - valid.len(), "Dropped invalid ids from agent sequence");
            corrected = true;
        }
        (!valid.is_empty()).then_some(valid)
    });

    let reasoning = match raw.reasoning {
        Some(r) if r.chars().count() > MAX_REASONING_LENGTH => {
            r.chars().take(MAX_REASONING_LENGTH).collect::<String>() + "..."
        }
        Some(r) => r,
        None => "No reasoning provided".into(),
    };

    let decision = OrchestratorDecision {
        selected_agent,
        reasoning,
        confidence,
        requires_multiple_agents,
        agent_sequence,
    };
    (decision, corrected)
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Build the user turn of the routing call.
pub fn build_routing_prompt(query: &str, context: &AgentContext) -> String {
    let mut prompt = format!("Location: {}\n", context.location.display_name());

    let history = context.recent_history(ROUTING_HISTORY_WINDOW);
    if !history.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for turn in history {
            let speaker = match turn.role {
                MessageRole::User => "User",
                MessageRole::Assistant => turn.agent_id.as_str(),
            };
            let _ = writeln!(prompt, "{speaker}: {}", turn.content.trim());
        }
    }

    let _ = write!(prompt, "\nRoute this request:\n\n{query}");
    prompt
}

/// Classifies queries with a model call.
pub struct LlmRouter {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl LlmRouter {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Ask the model for a decision.
    ///
    /// Gateway failures and undecodable replies are returned as errors; an
    /// id outside the closed set is corrected, never reported.
    pub async fn route(&self, query: &str, context: &AgentContext) -> Result<OrchestratorDecision> {
        debug!(
            content_preview = %query.chars().take(50).collect::<String>(),
            "Model triage"
        );

        let request = LlmRequest::prompt(build_routing_prompt(query, context))
            .with_system_prompt(ROUTING_SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0);

        let response = self.llm.complete(request).await?;
        debug!(response = %response.content, "Routing reply");

        let raw = parse_decision(&response.content)
            .map_err(|e| AgentDeskError::Parse(e.to_string()))?;
        let (decision, corrected) = sanitize_decision(raw);

        info!(
            agent = %decision.selected_agent,
            confidence = decision.confidence,
            multi = decision.requires_multiple_agents,
            corrected,
            "Model triage decision"
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_decision_from_prose() {
        let text = "Sure! Here you go:\n{\"selectedAgent\":\"leads\",\"confidence\":0.9}\nThanks";
        let raw = parse_decision(text).unwrap();
        assert_eq!(raw.selected_agent.as_deref(), Some("leads"));
        assert_eq!(raw.confidence, Some(json!(0.9)));
    }

    #[test]
    fn parse_decision_reports_failures() {
        assert_eq!(parse_decision("I think leads."), Err(DecisionParseError::NoJson));
        assert!(matches!(
            parse_decision(r#"{"selectedAgent": 7}"#),
            Err(DecisionParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn sanitize_accepts_case_and_padding() {
        let (decision, corrected) = sanitize_decision(RawDecision {
            selected_agent: Some("  Performance\n".into()),
            confidence: Some(json!(0.7)),
            ..Default::default()
        });
        assert_eq!(decision.selected_agent, AgentId::Performance);
        assert!((decision.confidence - 0.7).abs() < f32::EPSILON);
        assert!(!corrected);
    }

    #[test]
    fn sanitize_rejects_unfit_ids() {
        for bad in ["lead agent", "sell-agent", "none", "nonesuch", "marketing", ""] {
            let (decision, corrected) = sanitize_decision(RawDecision {
                selected_agent: Some(bad.into()),
                ..Default::default()
            });
            assert_eq!(decision.selected_agent, AgentId::CATCH_ALL, "{bad:?}");
            assert!(corrected);
        }

        let (decision, _) = sanitize_decision(RawDecision::default());
        assert_eq!(decision.selected_agent, AgentId::CATCH_ALL);
    }

    #[test]
    fn sanitize_clamps_confidence() {
        let (high, corrected) = sanitize_decision(RawDecision {
            selected_agent: Some("sell".into()),
            confidence: Some(json!(3.5)),
            ..Default::default()
        });
        assert_eq!(high.confidence, 1.0);
        assert!(corrected);

        let (low, _) = sanitize_decision(RawDecision {
            selected_agent: Some("sell".into()),
            confidence: Some(json!(-1.0)),
            ..Default::default()
        });
        assert_eq!(low.confidence, 0.0);

        let (missing, _) = sanitize_decision(RawDecision {
            selected_agent: Some("sell".into()),
            ..Default::default()
        });
        assert_eq!(missing.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn loose_confidence_keeps_selected_agent() {
        let raw = parse_decision(
            r#"{"selectedAgent":"sell","confidence":"high","requiresMultipleAgents":"no"}"#,
        )
        .unwrap();
        let (decision, corrected) = sanitize_decision(raw);
        assert_eq!(decision.selected_agent, AgentId::Sell);
        assert_eq!(decision.confidence, DEFAULT_CONFIDENCE);
        assert!(!decision.requires_multiple_agents);
        assert!(corrected);

        let raw = parse_decision(
            r#"{"selectedAgent":"leads","confidence":"0.75","requiresMultipleAgents":"true"}"#,
        )
        .unwrap();
        let (decision, _) = sanitize_decision(raw);
        assert!((decision.confidence - 0.75).abs() < f32::EPSILON);
        assert!(decision.requires_multiple_agents);
    }

    #[test]
    fn parse_decision_skips_unrelated_objects() {
        let text = r#"Context {"location":"malaysia"} decision: {"selectedAgent":"sell"}"#;
        let raw = parse_decision(text).unwrap();
        assert_eq!(raw.selected_agent.as_deref(), Some("sell"));
    }

    #[test]
    fn sanitize_filters_sequence() {
        let (decision, corrected) = sanitize_decision(RawDecision {
            selected_agent: Some("leads".into()),
            requires_multiple_agents: Some(json!(true)),
            agent_sequence: Some(vec!["leads".into(), "marketing".into(), " SELL".into()]),
            ..Default::default()
        });
        assert!(corrected);
        assert_eq!(
            decision.agent_sequence,
            Some(vec![AgentId::Leads, AgentId::Sell])
        );

        let (decision, _) = sanitize_decision(RawDecision {
            selected_agent: Some("leads".into()),
            agent_sequence: Some(vec!["bogus".into()]),
            ..Default::default()
        });
        assert_eq!(decision.agent_sequence, None);
    }

    #[test]
    fn sanitize_truncates_long_reasoning() {
        let (decision, _) = sanitize_decision(RawDecision {
            selected_agent: Some("leads".into()),
            reasoning: Some("x".repeat(2000)),
            ..Default::default()
        });
        assert_eq!(decision.reasoning.len(), MAX_REASONING_LENGTH + 3);
    }

    #[test]
    fn routing_prompt_includes_query_and_history() {
        let context = AgentContext::new(agentdesk_common::Location::Singapore).with_history(vec![
            agentdesk_common::AgentMessage::user("earlier question"),
        ]);
        let prompt = build_routing_prompt("Who is behind target?", &context);
        assert!(prompt.contains("Location: Singapore"));
        assert!(prompt.contains("User: earlier question"));
        assert!(prompt.ends_with("Route this request:\n\nWho is behind target?"));
    }
}
