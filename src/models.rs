// API request/response envelopes and data transfer types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grammar::types::GrammarFeedback;
use crate::store::types::{ConversationType, StoredMessage};

/// Successful response envelope: `{"success": true, "data": ..., "message": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Error response envelope: `{"success": false, "error": ..., "details": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }
}

// Request Types

#[derive(Debug, Clone, Deserialize)]
pub struct StartConversationRequest {
    pub first_message: String,
    #[serde(default)]
    pub search_context: Option<String>,
    #[serde(default)]
    pub conversation_type: Option<ConversationType>,
    #[serde(default)]
    pub role_character: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckGrammarRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// limit/offset pagination query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PageParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// `time_range` query parameter for grammar stats
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    pub time_range: Option<String>,
}

// Response Types

/// Response to starting a conversation
#[derive(Debug, Clone, Serialize)]
pub struct StartConversationResponse {
    pub conversation_id: Uuid,
    pub conversation_type: ConversationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_character: Option<String>,
    pub user_message_id: Uuid,
    pub response: String,
}

/// Response to sending a message into an existing conversation
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub message_id: Uuid,
    pub user_message_id: Uuid,
    pub response: String,
    pub turn_count: i32,
}

/// A stored message together with its grammar feedback, when available
#[derive(Debug, Clone, Serialize)]
pub struct MessageWithFeedback {
    #[serde(flatten)]
    pub message: StoredMessage,
    pub grammar_feedback: Option<GrammarFeedback>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::MessageRole;

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope::new(serde_json::json!({"k": "v"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["k"], "v");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_envelope_with_message() {
        let envelope = Envelope::with_message(serde_json::json!({}), "done");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["message"], "done");
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody::new("boom");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_start_request_deserialization_minimal() {
        let json = r#"{"first_message": "Hello!"}"#;
        let request: StartConversationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.first_message, "Hello!");
        assert!(request.search_context.is_none());
        assert!(request.conversation_type.is_none());
        assert!(request.role_character.is_none());
    }

    #[test]
    fn test_start_request_deserialization_full() {
        let json = r#"{
            "first_message": "Hi",
            "search_context": "news",
            "conversation_type": "ROLE_PLAYING",
            "role_character": "Cafe Barista"
        }"#;
        let request: StartConversationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.conversation_type,
            Some(ConversationType::RolePlaying)
        );
        assert_eq!(request.role_character.as_deref(), Some("Cafe Barista"));
    }

    #[test]
    fn test_send_message_request_deserialization() {
        let json = r#"{"message":"Hello, world!"}"#;
        let request: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.message, "Hello, world!");
    }

    #[test]
    fn test_page_params_defaults_and_clamping() {
        let params = PageParams::default();
        assert_eq!(params.limit(), 50);
        assert_eq!(params.offset(), 0);

        let params: PageParams = serde_json::from_str(r#"{"limit": 1000, "offset": -5}"#).unwrap();
        assert_eq!(params.limit(), 200);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_message_with_feedback_flattens() {
        let message = StoredMessage::new(Uuid::new_v4(), MessageRole::User, "hi there");
        let wrapped = MessageWithFeedback {
            message: message.clone(),
            grammar_feedback: None,
        };
        let value = serde_json::to_value(&wrapped).unwrap();
        assert_eq!(value["content"], "hi there");
        assert_eq!(value["role"], "user");
        assert!(value["grammar_feedback"].is_null());
    }

    #[test]
    fn test_send_message_response_serialization() {
        let response = SendMessageResponse {
            message_id: Uuid::new_v4(),
            user_message_id: Uuid::new_v4(),
            response: "Sounds good!".to_string(),
            turn_count: 3,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["response"], "Sounds good!");
        assert_eq!(value["turn_count"], 3);
    }
}
