//! HTTP client for an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::error::{CompletionError, CompletionResult};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatTurn};
use super::CompletionProvider;

/// Configuration for the chat-completions client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of the provider (e.g. "https://api.openai.com/v1").
    pub base_url: String,
    /// Bearer token, if the provider requires one.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.6,
            timeout_secs: 30,
        }
    }
}

/// Client for an OpenAI-compatible completion provider.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    config: CompletionConfig,
}

impl ChatCompletionsClient {
    /// Create a new client from config.
    ///
    /// Building the underlying HTTP client only fails on TLS backend
    /// misconfiguration, which is unrecoverable at startup anyway.
    pub fn new(config: CompletionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { client, config }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    async fn complete(&self, persona_prompt: &str, user_text: &str) -> CompletionResult<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatTurn::system(persona_prompt), ChatTurn::user(user_text)],
            temperature: Some(self.config.temperature),
        };

        let mut builder = self.client.post(self.completions_url()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(content.to_string())
    }
}
