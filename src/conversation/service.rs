//! Conversation orchestration
//!
//! Ties together the store, the LLM provider, and the grammar checker: each
//! turn persists the user message, assembles prompt context from history,
//! awaits the assistant reply, and kicks off grammar analysis in the
//! background.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Settings;
use crate::conversation::prompt;
use crate::error::AppError;
use crate::grammar::{FeedbackHub, GrammarService};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::{
    MessageWithFeedback, SendMessageRequest, SendMessageResponse, StartConversationRequest,
    StartConversationResponse,
};
use crate::state::AppState;
use crate::store::{
    Conversation, ConversationStatus, ConversationType, MessageRole, Store, StoredMessage,
};

/// Conversation service
pub struct ConversationService {
    store: Store,
    provider: Arc<dyn LlmProvider>,
    grammar: GrammarService,
    hub: FeedbackHub,
    settings: Arc<Settings>,
}

impl ConversationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            provider: state.provider.clone(),
            grammar: GrammarService::new(
                state.store.clone(),
                state.provider.clone(),
                state.settings.clone(),
            ),
            hub: state.hub.clone(),
            settings: state.settings.clone(),
        }
    }

    /// Start a new conversation with a first user message
    ///
    /// The assistant reply is returned; grammar feedback for the first
    /// message arrives later through the feedback stream.
    pub async fn start(
        &self,
        request: StartConversationRequest,
    ) -> Result<StartConversationResponse, AppError> {
        let first_message = request.first_message.trim().to_string();
        if first_message.is_empty() {
            return Err(AppError::Invalid(
                "first_message must not be empty".to_string(),
            ));
        }

        let conversation_type = request
            .conversation_type
            .unwrap_or(ConversationType::FreeChat);

        let conversation = Conversation::new(
            Some(prompt::title_from_first_message(&first_message)),
            conversation_type,
            request.role_character.clone(),
        );
        self.store.insert_conversation(&conversation).await?;

        let user_message =
            StoredMessage::new(conversation.id, MessageRole::User, first_message.as_str());
        self.store.insert_message(&user_message).await?;

        let system_prompt = prompt::build_system_prompt(
            request.search_context.as_deref(),
            conversation_type,
            request.role_character.as_deref(),
        );

        // First turn, so there is no history yet
        let reply = self.generate_reply(&system_prompt, &[], &first_message).await?;

        let assistant_message =
            StoredMessage::new(conversation.id, MessageRole::Assistant, reply.as_str());
        self.store.insert_message(&assistant_message).await?;
        self.store.update_message_count(conversation.id, 2).await?;

        self.grammar
            .spawn_check(self.hub.clone(), user_message.id, first_message, None);

        Ok(StartConversationResponse {
            conversation_id: conversation.id,
            conversation_type,
            role_character: conversation.role_character,
            user_message_id: user_message.id,
            response: reply,
        })
    }

    /// Continue an existing conversation with a user message
    pub async fn continue_conversation(
        &self,
        conversation_id: Uuid,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, AppError> {
        let text = request.message.trim().to_string();
        if text.is_empty() {
            return Err(AppError::Invalid("message must not be empty".to_string()));
        }

        let conversation = self.store.find_conversation(conversation_id).await?;

        let user_message = StoredMessage::new(conversation.id, MessageRole::User, text.as_str());
        self.store.insert_message(&user_message).await?;

        let recent = self
            .store
            .recent_messages(conversation.id, self.settings.max_history_turns)
            .await?;
        let history = history_excluding(recent, user_message.id);
        let previous_reply = last_assistant_reply(&history);

        // Search context only seeds the first turn
        let system_prompt = prompt::build_system_prompt(
            None,
            conversation.conversation_type,
            conversation.role_character.as_deref(),
        );

        let reply = self.generate_reply(&system_prompt, &history, &text).await?;

        let assistant_message =
            StoredMessage::new(conversation.id, MessageRole::Assistant, reply.as_str());
        self.store.insert_message(&assistant_message).await?;

        let new_count = conversation.message_count + 2;
        self.store
            .update_message_count(conversation.id, new_count)
            .await?;

        self.grammar
            .spawn_check(self.hub.clone(), user_message.id, text, previous_reply);

        Ok(SendMessageResponse {
            message_id: assistant_message.id,
            user_message_id: user_message.id,
            response: reply,
            turn_count: new_count / 2,
        })
    }

    /// Fetch a conversation
    pub async fn get(&self, conversation_id: Uuid) -> Result<Conversation, AppError> {
        Ok(self.store.find_conversation(conversation_id).await?)
    }

    /// List conversations, most recent first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Conversation>, AppError> {
        Ok(self.store.list_conversations(limit, offset).await?)
    }

    /// List a conversation's messages, each with its grammar feedback
    pub async fn messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageWithFeedback>, AppError> {
        // Distinguish an unknown conversation from an empty one
        self.store.find_conversation(conversation_id).await?;

        let rows = self
            .store
            .list_messages(conversation_id, limit, offset)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(message, grammar_feedback)| MessageWithFeedback {
                message,
                grammar_feedback,
            })
            .collect())
    }

    /// Mark a conversation as completed
    pub async fn end(&self, conversation_id: Uuid) -> Result<(), AppError> {
        Ok(self
            .store
            .update_status(conversation_id, ConversationStatus::Completed)
            .await?)
    }

    /// Delete a conversation and everything attached to it
    pub async fn delete(&self, conversation_id: Uuid) -> Result<(), AppError> {
        Ok(self.store.delete_conversation(conversation_id).await?)
    }

    async fn generate_reply(
        &self,
        system_prompt: &str,
        history: &[StoredMessage],
        user_input: &str,
    ) -> Result<String, AppError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().map(chat_message_from_stored));
        messages.push(ChatMessage::user(user_input));

        let request = ChatRequest {
            messages,
            model: self.settings.model_for_provider().to_string(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self.provider.chat_completion(request).await?;
        Ok(response.content)
    }
}

fn chat_message_from_stored(message: &StoredMessage) -> ChatMessage {
    match message.role {
        MessageRole::User => ChatMessage::user(message.content.as_str()),
        MessageRole::Assistant => ChatMessage::assistant(message.content.as_str()),
        MessageRole::System => ChatMessage::system(message.content.as_str()),
    }
}

/// Drop the message currently being responded to from the history window
fn history_excluding(messages: Vec<StoredMessage>, exclude: Uuid) -> Vec<StoredMessage> {
    messages.into_iter().filter(|m| m.id != exclude).collect()
}

/// The most recent assistant message, used as grammar-check context
fn last_assistant_reply(history: &[StoredMessage]) -> Option<String> {
    history
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
        .map(|m| m.content.clone())
}
