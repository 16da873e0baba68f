//! HTTP route handlers for the API.

use crate::AppState;
use agentdesk_agents::{Agent, AgentExecutor, AgentId, AgentRegistry, NoopHooks, WorkflowResult};
use agentdesk_common::{AgentContext, AgentDeskError, AgentMessage};
use agentdesk_coordinator::OrchestratorDecision;
use axum::{
    Json,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    extract::State,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub model: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        model: state.coordinator.model_name().to_string(),
    })
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub code: &'static str,
}

impl ErrorResponse {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            code: "INVALID_REQUEST",
        }
    }
}

impl From<AgentDeskError> for ErrorResponse {
    fn from(err: AgentDeskError) -> Self {
        let (status, code) = match &err {
            AgentDeskError::UnknownAgent(_) => (StatusCode::NOT_FOUND, "UNKNOWN_AGENT"),
            AgentDeskError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            AgentDeskError::Backend { .. } | AgentDeskError::Transport(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        Self {
            status,
            error: err.to_string(),
            code,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn require_query(query: &str) -> Result<(), ErrorResponse> {
    if query.trim().is_empty() {
        return Err(ErrorResponse::bad_request("query must not be empty"));
    }
    Ok(())
}

/// Registry listing.
#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<&'static Agent>,
}

/// List the five agents in canonical order.
pub async fn list_agents() -> Json<AgentsResponse> {
    Json(AgentsResponse {
        agents: AgentRegistry::global().all(),
    })
}

/// Routing request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub query: String,
    #[serde(default)]
    pub context: AgentContext,
}

/// Return the routing decision without running an agent.
pub async fn route_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<OrchestratorDecision>, ErrorResponse> {
    require_query(&request.query)?;
    let decision = state.coordinator.route(&request.query, &request.context).await;
    Ok(Json(decision))
}

/// Chat request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub context: AgentContext,
    /// Skip routing and answer with this agent
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

/// Chat response body; also the payload of the final `done` stream event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Present when the request was routed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<OrchestratorDecision>,
    pub message: AgentMessage,
}

fn agent_reply(agent: AgentId, content: String) -> AgentMessage {
    let name = AgentRegistry::global().get(agent).name;
    AgentMessage::from_agent(agent.as_str(), name, content)
}

/// Route (unless an agent is given) and answer.
///
/// With `stream: true` the answer arrives as SSE: `chunk` events with raw
/// text, then one `done` event carrying a [`ChatResponse`], or an `error`
/// event if the agent call fails midway.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ErrorResponse> {
    require_query(&request.query)?;

    let (agent, decision) = match request.agent_id.as_deref() {
        Some(id) => (AgentExecutor::resolve(id)?.id, None),
        None => {
            let decision = state.coordinator.route(&request.query, &request.context).await;
            (decision.selected_agent, Some(decision))
        }
    };

    info!(
        agent = %agent,
        routed = decision.is_some(),
        stream = request.stream,
        "Chat request"
    );

    if request.stream {
        let events = stream_agent(state, agent, decision, request.query, request.context);
        return Ok(Sse::new(events).keep_alive(KeepAlive::default()).into_response());
    }

    let content = state
        .coordinator
        .execute(agent.as_str(), &request.query, &request.context, None)
        .await
        .inspect_err(|e| error!(agent = %agent, error = %e, "Agent execution failed"))?;

    Ok(Json(ChatResponse {
        decision,
        message: agent_reply(agent, content),
    })
    .into_response())
}

/// Aborts the producing task when the client goes away.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run `agent` in a background task and expose its output as SSE events.
///
/// Dropping the returned stream (client disconnect) aborts the task, which
/// in turn drops the upstream model connection.
fn stream_agent(
    state: Arc<AppState>,
    agent: AgentId,
    decision: Option<OrchestratorDecision>,
    query: String,
    context: AgentContext,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    let task = tokio::spawn(async move {
        let chunk_tx = tx.clone();
        let mut on_chunk = move |chunk: &str| {
            // SSE data cannot carry carriage returns.
            let data = chunk.replace('\r', "");
            // A closed receiver means the client left; the task is aborted next.
            let _ = chunk_tx.send(Event::default().event("chunk").data(data));
        };

        let result = state
            .coordinator
            .execute(agent.as_str(), &query, &context, Some(&mut on_chunk))
            .await;

        let event = match result {
            Ok(content) => {
                debug!(agent = %agent, len = content.len(), "Stream completed");
                let done = ChatResponse {
                    decision,
                    message: agent_reply(agent, content),
                };
                Event::default()
                    .event("done")
                    .json_data(&done)
                    .unwrap_or_else(|_| Event::default().event("done"))
            }
            Err(e) => {
                warn!(agent = %agent, error = %e, "Stream failed");
                let body = ErrorResponse::from(e);
                Event::default()
                    .event("error")
                    .json_data(&body)
                    .unwrap_or_else(|_| Event::default().event("error").data(body.error))
            }
        };
        let _ = tx.send(event);
    });

    futures::stream::unfold((rx, AbortOnDrop(task)), |(mut rx, guard)| async move {
        rx.recv().await.map(|event| (Ok(event), (rx, guard)))
    })
}

/// Workflow request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub query: String,
    #[serde(default)]
    pub context: AgentContext,
    /// Explicit sequence; routed when absent
    #[serde(default)]
    pub agent_sequence: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStepResponse {
    pub agent_id: AgentId,
    pub output: String,
    pub duration_ms: u64,
}

/// Workflow response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<OrchestratorDecision>,
    /// Steps in execution order
    pub steps: Vec<WorkflowStepResponse>,
    /// Output per agent; a repeated agent keeps its last output
    pub results: HashMap<AgentId, String>,
    pub final_output: Option<String>,
    pub duration_ms: u64,
}

impl WorkflowResponse {
    fn new(decision: Option<OrchestratorDecision>, result: WorkflowResult) -> Self {
        let results = result.by_agent();
        let final_output = result.final_output().map(String::from);
        Self {
            decision,
            steps: result
                .steps
                .into_iter()
                .map(|step| WorkflowStepResponse {
                    agent_id: step.agent_id,
                    output: step.output,
                    duration_ms: step.duration_ms,
                })
                .collect(),
            results,
            final_output,
            duration_ms: result.duration_ms,
        }
    }
}

/// Run a sequence of agents.
///
/// Without an explicit sequence the query is routed; a multi-agent decision
/// supplies the sequence, otherwise the selected agent runs alone.
pub async fn workflow_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ErrorResponse> {
    require_query(&request.query)?;

    let (sequence, decision) = match request.agent_sequence {
        Some(sequence) if sequence.is_empty() => {
            return Err(ErrorResponse::bad_request("agentSequence must not be empty"));
        }
        Some(sequence) => (sequence, None),
        None => {
            let decision = state.coordinator.route(&request.query, &request.context).await;
            let sequence = match decision.workflow_sequence() {
                Some(ids) => ids.iter().map(|id| id.as_str().to_string()).collect(),
                None => vec![decision.selected_agent.as_str().to_string()],
            };
            (sequence, Some(decision))
        }
    };

    info!(sequence = ?sequence, routed = decision.is_some(), "Workflow request");

    let result = state
        .coordinator
        .run_workflow(&sequence, &request.query, &request.context, &NoopHooks)
        .await
        .inspect_err(|e| error!(error = %e, "Workflow failed"))?;

    Ok(Json(WorkflowResponse::new(decision, result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (AgentDeskError::UnknownAgent("x".into()), StatusCode::NOT_FOUND),
            (AgentDeskError::Config("no key".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                AgentDeskError::Backend {
                    status: 529,
                    body: "overloaded".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (AgentDeskError::Transport("reset".into()), StatusCode::BAD_GATEWAY),
            (AgentDeskError::Parse("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ErrorResponse::from(err).status, status);
        }
    }

    #[test]
    fn error_response_hides_status_field() {
        let json = serde_json::to_value(ErrorResponse::bad_request("nope")).unwrap();
        assert_eq!(json["code"], "INVALID_REQUEST");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn chat_request_deserialization() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"query":"Hi","agentId":"leads","stream":true,"context":{"location":"singapore"}}"#,
        )
        .unwrap();
        assert_eq!(request.agent_id.as_deref(), Some("leads"));
        assert!(request.stream);
        assert_eq!(request.context.location, agentdesk_common::Location::Singapore);
    }

    #[test]
    fn chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"query":"Hi"}"#).unwrap();
        assert!(request.agent_id.is_none());
        assert!(!request.stream);
        assert!(request.context.conversation_history.is_empty());
    }

    #[test]
    fn empty_query_is_rejected() {
        assert!(require_query("  ").is_err());
        assert!(require_query("Hi").is_ok());
    }
}
