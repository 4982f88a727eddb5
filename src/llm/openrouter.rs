//! OpenRouter provider implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::core::{
    error::LlmError,
    provider::LlmProvider,
    types::{ChatMessage, ChatRequest, ChatResponse, TokenUsage},
};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const REFERER: &str = "https://github.com/parlance-app";

/// Client for the hosted OpenRouter chat-completions API
pub struct OpenRouterProvider {
    /// HTTP client for making requests
    http_client: Client,
    /// Bearer key for the OpenRouter account
    api_key: String,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = ChatCompletionBody::from_request(&request);

        let response = self
            .http_client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", REFERER)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(LlmError::RateLimitExceeded { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatCompletionReply = response.json().await?;
        reply.into_response()
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

/// Wire format of a chat-completions request
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

impl<'a> ChatCompletionBody<'a> {
    pub(crate) fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Wire format of a chat-completions response
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionReply {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyMessage {
    #[serde(default)]
    pub content: String,
}

impl ChatCompletionReply {
    /// Map the wire response into the abstraction's response type
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::types::ChatMessage;

    #[test]
    fn test_request_body_serialization() {
        let request = ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            model: "meta-llama/llama-3.3-70b-instruct:free".to_string(),
            max_tokens: 4000,
            temperature: 0.7,
        };
        let body = ChatCompletionBody::from_request(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "meta-llama/llama-3.3-70b-instruct:free");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_reply_deserialization() {
        let raw = r#"{
            "model": "meta-llama/llama-3.3-70b-instruct:free",
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
        }"#;
        let reply: ChatCompletionReply = serde_json::from_str(raw).unwrap();
        let response = reply.into_response().unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(
            response.model.as_deref(),
            Some("meta-llama/llama-3.3-70b-instruct:free")
        );
        assert_eq!(response.usage.unwrap().total_tokens, 25);
    }

    #[test]
    fn test_reply_without_choices_is_error() {
        let reply: ChatCompletionReply = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            reply.into_response(),
            Err(LlmError::ProviderError { .. })
        ));
    }

    #[test]
    fn test_provider_name() {
        let provider = OpenRouterProvider::new("test-key".to_string()).unwrap();
        assert_eq!(provider.name(), "openrouter");
    }
}
