use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::anthropic::AnthropicClient;
use crate::client::LlmClient;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Static gateway configuration, read once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL; `/v1/messages` is appended
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Explicit key. When unset the key is read from `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Output token bound used when a request does not set its own
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.into()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: default_api_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or the environment.
    ///
    /// Priority:
    /// 1. Explicit, non-empty `api_key`
    /// 2. The variable named by `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key
            && !key.is_empty()
        {
            return Some(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }
}

/// Build the shared gateway instance.
pub fn build_llm_client(config: &LlmConfig) -> Arc<dyn LlmClient> {
    Arc::new(AnthropicClient::new(config))
}
