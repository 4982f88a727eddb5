use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::error::Error;

/// Lifecycle state of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStatus {
    Active,
    Completed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "ACTIVE",
            ConversationStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, Error> {
        match raw {
            "ACTIVE" => Ok(ConversationStatus::Active),
            "COMPLETED" => Ok(ConversationStatus::Completed),
            other => Err(Error::ValidationError(format!(
                "unknown conversation status '{}'",
                other
            ))),
        }
    }
}

/// Kind of conversation the assistant runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationType {
    FreeChat,
    RolePlaying,
}

impl ConversationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationType::FreeChat => "FREE_CHAT",
            ConversationType::RolePlaying => "ROLE_PLAYING",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, Error> {
        match raw {
            "FREE_CHAT" => Ok(ConversationType::FreeChat),
            "ROLE_PLAYING" => Ok(ConversationType::RolePlaying),
            other => Err(Error::ValidationError(format!(
                "unknown conversation type '{}'",
                other
            ))),
        }
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, Error> {
        match raw {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "system" => Ok(MessageRole::System),
            other => Err(Error::ValidationError(format!(
                "unknown message role '{}'",
                other
            ))),
        }
    }
}

/// A stored conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: Option<String>,
    pub conversation_type: ConversationType,
    pub role_character: Option<String>,
    pub message_count: i32,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new active conversation
    pub fn new(
        title: Option<String>,
        conversation_type: ConversationType,
        role_character: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            conversation_type,
            role_character,
            message_count: 0,
            status: ConversationStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Create a new message belonging to a conversation
    pub fn new(conversation_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
