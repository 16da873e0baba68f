//! AgentDesk API server binary.
//!
//! Usage:
//!   agentdesk-api --config agentdesk.toml
//!   agentdesk-api --port 8080 --bind 0.0.0.0
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY` - Model backend key (unless set in the config file)
//! - `AGENTDESK_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `RUST_LOG` - Log filter

use agentdesk_api::{AppState, serve};
use agentdesk_coordinator::CoordinatorConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "agentdesk-api")]
#[command(about = "Routes agency questions to specialist agents", version)]
struct Cli {
    /// Path to config.toml file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Bind address
    #[arg(short, long, env = "AGENTDESK_BIND_ADDR", default_value = "127.0.0.1")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agentdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.bind == "0.0.0.0" {
        tracing::warn!(
            "Server binding to 0.0.0.0 exposes the API to all network interfaces. \
             The API has no authentication; put it behind a firewall or proxy."
        );
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            CoordinatorConfig::from_file(path)?
        }
        None => {
            tracing::info!("Using default configuration");
            CoordinatorConfig::default()
        }
    };

    if config.provider.llm.resolve_api_key().is_none() {
        tracing::warn!(
            env = %config.provider.llm.api_key_env,
            "No API key configured; routing will use keyword fallback and agent calls will fail"
        );
    }

    let state = AppState::new(&config)?;

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    serve(Arc::new(state), addr).await?;

    Ok(())
}
