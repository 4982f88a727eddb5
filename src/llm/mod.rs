//! LLM Abstraction Layer
//!
//! This module provides a unified interface for the chat-completions services
//! the product talks to: the hosted OpenRouter API and a local Ollama server.

pub mod core;
pub mod ollama;
pub mod openrouter;

// Re-export commonly used types
pub use self::core::{
    error::LlmError,
    provider::{create_provider, LlmProvider},
    types::{ChatMessage, ChatRequest, ChatResponse, ChatRole, TokenUsage},
};
