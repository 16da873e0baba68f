//! HTTP API for the AgentDesk orchestrator.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/v1/agents` - The five registered agents
//! - `POST /api/v1/route` - Routing decision only
//! - `POST /api/v1/chat` - Route and answer, optionally streamed as SSE
//! - `POST /api/v1/workflow` - Run a sequence of agents
//!
//! # Architecture
//!
//! ```text
//! Client (dashboard)
//!    │
//!    ▼
//! ┌─────────────────┐
//! │   API Gateway   │ ◄── This crate
//! │     (Axum)      │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │   Coordinator   │ ──► │  Anthropic API  │
//! └─────────────────┘     └─────────────────┘
//! ```

pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/agents", get(routes::list_agents))
        .route("/api/v1/route", post(routes::route_handler))
        .route("/api/v1/chat", post(routes::chat_handler))
        .route("/api/v1/workflow", post(routes::workflow_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    info!(%addr, "Starting AgentDesk API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
