//! LLM gateway for AgentDesk.
//!
//! [`LlmClient`] is the seam the rest of the workspace depends on; the
//! Anthropic Messages API is the production implementation.

pub mod anthropic;
pub mod client;
pub mod config;
pub mod sse;

pub use anthropic::AnthropicClient;
pub use client::{ChatMessage, ChunkSink, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{LlmConfig, build_llm_client};
pub use sse::SseDecoder;
