//! Error types for AgentDesk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentDeskError {
    /// Missing or invalid setup. Never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The LLM backend answered with a non-success status.
    #[error("Backend error {status}: {body}")]
    Backend { status: u16, body: String },

    /// The request never produced a usable response (connect, read, decode).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AgentDeskError {
    /// Whether the error points at a setup problem rather than a failed call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, AgentDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_carries_status_and_body() {
        let err = AgentDeskError::Backend {
            status: 529,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "Backend error 529: overloaded");
        assert!(!err.is_fatal());
    }

    #[test]
    fn config_error_is_fatal() {
        assert!(AgentDeskError::Config("missing key".into()).is_fatal());
        assert!(!AgentDeskError::UnknownAgent("nobody".into()).is_fatal());
    }
}
