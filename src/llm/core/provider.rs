//! Provider trait for LLM implementations

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    error::LlmError,
    types::{ChatRequest, ChatResponse},
};
use crate::config::{ProviderKind, Settings};
use crate::llm::ollama::OllamaProvider;
use crate::llm::openrouter::OpenRouterProvider;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a chat completion
    ///
    /// Sends the full conversation to the provider and awaits the complete
    /// assistant reply.
    ///
    /// # Arguments
    /// * `request` - The chat request with messages and generation parameters
    ///
    /// # Returns
    /// The assistant reply, or an error if the request fails
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Provider name for logs and diagnostics
    fn name(&self) -> &'static str;
}

/// Create an LLM provider from the application settings
///
/// This factory function creates the appropriate provider client based on
/// the configured provider kind and validates that the credentials it needs
/// are present.
///
/// # Example
///
/// ```rust,no_run
/// use parlance::config::Settings;
/// use parlance::llm::create_provider;
///
/// # fn example(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
/// let provider = create_provider(settings)?;
/// # Ok(())
/// # }
/// ```
pub fn create_provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match settings.llm_provider {
        ProviderKind::OpenRouter => {
            let api_key = settings.openrouter_api_key.clone().ok_or_else(|| {
                LlmError::AuthenticationError(
                    "OPENROUTER_API_KEY is required when LLM_PROVIDER is openrouter".to_string(),
                )
            })?;
            Ok(Arc::new(OpenRouterProvider::new(api_key)?))
        }
        ProviderKind::Ollama => {
            if settings.ollama_base_url.is_empty() {
                return Err(LlmError::InvalidRequest(
                    "OLLAMA_BASE_URL is required when LLM_PROVIDER is ollama".to_string(),
                ));
            }
            Ok(Arc::new(OllamaProvider::new(
                settings.ollama_base_url.clone(),
            )?))
        }
    }
}
