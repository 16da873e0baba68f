use agentdesk_common::{AgentDeskError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{ChunkSink, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
use crate::config::LlmConfig;
use crate::sse::SseDecoder;

const MESSAGES_PATH: &str = "/v1/messages";

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
    usage: Option<AnthropicUsage>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Gateway to the Anthropic Messages API.
///
/// Holds only static configuration, so one instance can be shared across
/// concurrent requests behind an `Arc`.
pub struct AnthropicClient {
    model: String,
    endpoint: String,
    api_key: Option<String>,
    api_version: String,
    default_max_tokens: u32,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Self {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            info!("No Anthropic API key configured; backend calls will fail until one is set");
        }

        Self {
            model: config.model.clone(),
            endpoint: format!("{}{}", config.api_url.trim_end_matches('/'), MESSAGES_PATH),
            api_key,
            api_version: config.api_version.clone(),
            default_max_tokens: config.max_tokens,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AgentDeskError::Config(
                "Anthropic API key not found. Set ANTHROPIC_API_KEY or provider.api_key in config."
                    .into(),
            )
        })
    }

    fn role_to_string(role: &Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_request_body(&self, request: &LlmRequest, stream: bool) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|msg| AnthropicMessage {
                    role: Self::role_to_string(&msg.role).to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            system: request.system_prompt.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            stream,
        }
    }

    /// Send the request and turn a non-success status into a backend error.
    async fn send(&self, body: &AnthropicRequest) -> Result<reqwest::Response> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| AgentDeskError::Transport(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AgentDeskError::Backend {
                status: status.as_u16(),
                body: body_text,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = self.build_request_body(&request, false);
        let response = self.send(&body).await?;

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            AgentDeskError::Transport(format!("Failed to parse Anthropic response: {e}"))
        })?;

        let content = anthropic_response
            .content
            .into_iter()
            .find(|c| c.content_type == "text")
            .and_then(|c| c.text)
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: anthropic_response.model,
            usage: anthropic_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
            finish_reason: anthropic_response.stop_reason,
        })
    }

    async fn stream(&self, request: LlmRequest, on_chunk: ChunkSink<'_>) -> Result<LlmResponse> {
        let body = self.build_request_body(&request, true);
        let response = self.send(&body).await?;

        let mut decoder = SseDecoder::new();
        let mut content = String::new();
        let mut bytes = response.bytes_stream();

        while let Some(item) = bytes.next().await {
            let chunk = item
                .map_err(|e| AgentDeskError::Transport(format!("Stream read failed: {e}")))?;
            for delta in decoder.push(&chunk) {
                on_chunk(&delta);
                content.push_str(&delta);
            }
        }
        if let Some(delta) = decoder.finish() {
            on_chunk(&delta);
            content.push_str(&delta);
        }

        debug!(
            model = %self.model,
            chars = content.len(),
            saw_done = decoder.is_done(),
            "Stream finished"
        );

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage: None,
            finish_reason: None,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
