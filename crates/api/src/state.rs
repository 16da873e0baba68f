//! Application state for the API server.

use agentdesk_coordinator::{Coordinator, CoordinatorConfig};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for the API server.
pub struct AppState {
    /// Routes and runs every request; holds no per-request state
    pub coordinator: Arc<Coordinator>,

    /// Server start time (for health checks)
    pub start_time: Instant,
}

impl AppState {
    /// Create application state from the coordinator configuration.
    pub fn new(config: &CoordinatorConfig) -> agentdesk_common::Result<Self> {
        Ok(Self::with_coordinator(Coordinator::from_config(config)?))
    }

    /// Wrap an already built coordinator, e.g. one with an injected gateway.
    pub fn with_coordinator(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            start_time: Instant::now(),
        }
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
