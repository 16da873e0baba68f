//! Grounding prompt construction.

use crate::registry::Agent;
use agentdesk_common::{AgentContext, DomainSnapshot, MessageRole};
use std::fmt::Write as _;

/// Number of prior turns carried into a grounding prompt.
pub const HISTORY_WINDOW: usize = 5;

/// Build the user-turn prompt for one agent call.
///
/// The prompt carries the recent conversation, the location's data snapshot,
/// any page data the caller attached and finally the request itself.
pub fn build_grounded_prompt(
    agent: &Agent,
    query: &str,
    context: &AgentContext,
    snapshot: &DomainSnapshot,
) -> String {
    let mut prompt = format!("Location: {}\n", context.location.display_name());

    let history = context.recent_history(HISTORY_WINDOW);
    if !history.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for turn in history {
            let speaker = match turn.role {
                MessageRole::User => "User",
                MessageRole::Assistant => turn.agent_name.as_str(),
            };
            let _ = writeln!(prompt, "{speaker}: {}", turn.content.trim());
        }
    }

    prompt.push('\n');
    prompt.push_str(&snapshot.format_for_prompt(context.location));

    if let Some(data) = &context.current_data {
        let rendered = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        let _ = write!(prompt, "\nCurrent page data:\n{rendered}\n");
    }

    let _ = write!(
        prompt,
        "\nUser request:\n{query}\n\n\
         Respond as the {name}. Ground every recommendation in the data above and cite the \
         record IDs you rely on (for example L-102 or C-001). If the data does not cover the \
         request, say so instead of guessing. Do not output routing decisions or JSON.",
        name = agent.name,
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AgentId, AgentRegistry};
    use agentdesk_common::{AgentMessage, Lead, Location};

    fn snapshot() -> DomainSnapshot {
        DomainSnapshot {
            leads: vec![Lead {
                id: "L-102".into(),
                name: "Aisyah".into(),
                status: "warm".into(),
                score: 82,
                interest: Some("medical card".into()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn prompt_contains_query_data_and_citation_rule() {
        let agent = AgentRegistry::global().get(AgentId::Leads);
        let context = AgentContext::new(Location::Singapore);
        let prompt = build_grounded_prompt(agent, "Which lead first?", &context, &snapshot());

        assert!(prompt.starts_with("Location: Singapore"));
        assert!(prompt.contains("=== SINGAPORE DATA ==="));
        assert!(prompt.contains("L-102 (Aisyah)"));
        assert!(prompt.contains("User request:\nWhich lead first?"));
        assert!(prompt.contains("Lead Management Agent"));
        assert!(prompt.contains("cite the record IDs"));
        assert!(!prompt.contains("Recent conversation"));
    }

    #[test]
    fn prompt_keeps_only_recent_turns() {
        let history = (0..8)
            .map(|i| AgentMessage::user(format!("turn {i}")))
            .collect();
        let context = AgentContext::new(Location::Malaysia).with_history(history);
        let agent = AgentRegistry::global().get(AgentId::Assistant);
        let prompt = build_grounded_prompt(agent, "q", &context, &DomainSnapshot::default());

        assert!(!prompt.contains("turn 2"));
        for i in 3..8 {
            assert!(prompt.contains(&format!("User: turn {i}")));
        }
    }

    #[test]
    fn prompt_names_agents_in_history_and_includes_page_data() {
        let history = vec![
            AgentMessage::user("hi"),
            AgentMessage::from_agent("sell", "Sales Agent", "CU-7 lacks cover"),
        ];
        let context = AgentContext::new(Location::Malaysia)
            .with_history(history)
            .with_current_data(serde_json::json!({"page": "customers"}));
        let agent = AgentRegistry::global().get(AgentId::Sell);
        let prompt = build_grounded_prompt(agent, "q", &context, &DomainSnapshot::default());

        assert!(prompt.contains("Sales Agent: CU-7 lacks cover"));
        assert!(prompt.contains("Current page data:"));
        assert!(prompt.contains("\"page\": \"customers\""));
        assert!(prompt.contains("No records available"));
    }
}
