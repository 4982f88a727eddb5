//! Ollama provider implementation
//!
//! Talks to a local Ollama server through its OpenAI-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::core::{
    error::LlmError,
    provider::LlmProvider,
    types::{ChatMessage, ChatRequest, ChatResponse, TokenUsage},
};

/// Client for a local Ollama server
pub struct OllamaProvider {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL of the Ollama server
    base_url: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: String) -> Result<Self, LlmError> {
        // Local hardware is slower than the hosted APIs
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = OllamaChatBody::from_request(&request);

        let response = self
            .http_client
            .post(self.endpoint_url())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let reply: OllamaChatReply = response.json().await?;
        reply.into_response()
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

/// Wire format of an Ollama chat request
#[derive(Debug, Serialize)]
pub(crate) struct OllamaChatBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub options: OllamaOptions,
}

/// Generation options understood by Ollama
#[derive(Debug, Serialize)]
pub(crate) struct OllamaOptions {
    pub num_predict: u32,
    pub temperature: f32,
}

impl<'a> OllamaChatBody<'a> {
    pub(crate) fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            options: OllamaOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

/// Wire format of an Ollama chat response
#[derive(Debug, Deserialize)]
pub(crate) struct OllamaChatReply {
    #[serde(default)]
    pub choices: Vec<OllamaChoice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaChoice {
    pub message: OllamaReplyMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaReplyMessage {
    #[serde(default)]
    pub content: String,
}

impl OllamaChatReply {
    pub(crate) fn into_response(mut self) -> Result<ChatResponse, LlmError> {
        if self.choices.is_empty() {
            return Err(LlmError::ProviderError {
                code: "empty_response".to_string(),
                message: "response contained no choices".to_string(),
            });
        }
        let content = self.choices.remove(0).message.content;

        Ok(ChatResponse {
            content,
            model: self.model,
            usage: self.usage,
        })
    }
}
