//! Chat-completion client for an OpenAI-compatible upstream.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProxyError;
use super::tasks::SYSTEM_PROMPT;
use crate::config::LlmConfig;

/// One prompt in, one completion out.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Whether upstream credentials are configured. Checked before any call.
    fn has_credentials(&self) -> bool;

    /// Send `prompt` with the fixed system prompt and return the raw reply.
    async fn complete(&self, prompt: &str) -> Result<String, ProxyError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Longest upstream error body echoed back to the caller.
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct OpenAiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    /// Build a client whose every request is bounded by
    /// `config.timeout_secs`.
    pub fn new(config: LlmConfig) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    fn has_credentials(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProxyError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProxyError::MissingCredentials)?;

        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(ProxyError::Upstream(format!(
                "Upstream returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProxyError::Upstream("Upstream returned no completion".into()))
    }
}
