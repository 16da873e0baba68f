//! Configuration for the coordinator.
//!
//! ```toml
//! data_path = "./data/snapshots.json"
//!
//! [provider]
//! model = "claude-sonnet-4-20250514"
//! max_tokens = 2048
//! routing_max_tokens = 512
//! ```
//!
//! On Unix a config file holding an API key must not be world-readable.

use agentdesk_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Main coordinator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    /// JSON file with per-location domain snapshots. No data when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Gateway settings; `max_tokens` bounds agent replies
    #[serde(flatten)]
    pub llm: LlmConfig,

    /// Output bound for routing calls
    #[serde(default = "default_routing_max_tokens")]
    pub routing_max_tokens: u32,
}

/// Routing replies are a single short JSON object.
pub const DEFAULT_ROUTING_MAX_TOKENS: u32 = 512;

fn default_routing_max_tokens() -> u32 {
    DEFAULT_ROUTING_MAX_TOKENS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            routing_max_tokens: default_routing_max_tokens(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config = Self::from_toml(&content)?;

        if config.provider.llm.api_key.is_some() {
            #[cfg(unix)]
            validate_key_file_permissions(path)?;

            warn!(
                "API key found in config file '{}'. Prefer the {} environment variable.",
                path.display(),
                config.provider.llm.api_key_env
            );
        }

        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Reject a key-bearing config file that other users can read.
#[cfg(unix)]
fn validate_key_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             Fix with: chmod 600 {}",
            path.display(),
            mode,
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = CoordinatorConfig::from_toml("").unwrap();
        assert_eq!(config.provider.routing_max_tokens, 512);
        assert_eq!(config.provider.llm.model, agentdesk_llm::LlmConfig::default().model);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn provider_fields_flatten_into_llm_config() {
        let config = CoordinatorConfig::from_toml(
            r#"
data_path = "fixtures/data.json"

[provider]
model = "claude-3-5-haiku-latest"
api_url = "http://localhost:9000"
max_tokens = 1024
routing_max_tokens = 256
"#,
        )
        .unwrap();

        assert_eq!(config.provider.llm.model, "claude-3-5-haiku-latest");
        assert_eq!(config.provider.llm.api_url, "http://localhost:9000");
        assert_eq!(config.provider.llm.max_tokens, 1024);
        assert_eq!(config.provider.routing_max_tokens, 256);
        assert_eq!(config.data_path, Some(PathBuf::from("fixtures/data.json")));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(CoordinatorConfig::from_toml("[provider\nmodel = 1").is_err());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = CoordinatorConfig::from_file("/nonexistent/agentdesk.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
