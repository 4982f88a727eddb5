//! Grammar feedback data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a detected writing error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Grammar,
    WordChoice,
    Expression,
    Spelling,
    Punctuation,
}

/// Character range of an error within the original sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    pub start: u32,
    pub end: u32,
}

/// A single detected error with its correction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarIssue {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub original: String,
    pub corrected: String,
    pub explanation: String,
    pub position: ErrorSpan,
}

/// Result of analyzing one sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarAnalysis {
    #[serde(default)]
    pub has_errors: bool,
    #[serde(default)]
    pub errors: Vec<GrammarIssue>,
    #[serde(default)]
    pub corrected_sentence: String,
    /// 0.0-1.0 scale
    #[serde(default = "default_quality")]
    pub overall_quality: f32,
}

fn default_quality() -> f32 {
    1.0
}

impl GrammarAnalysis {
    /// Analysis reporting no errors
    ///
    /// Used as the fallback when the model reply cannot be parsed; a failed
    /// analysis must never fail the surrounding request.
    pub fn clean() -> Self {
        Self {
            has_errors: false,
            errors: Vec::new(),
            corrected_sentence: String::new(),
            overall_quality: 1.0,
        }
    }
}

/// Stored grammar feedback for a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarFeedback {
    pub id: Uuid,
    pub message_id: Uuid,
    pub original_text: String,
    pub corrected_text: String,
    pub has_errors: bool,
    pub errors: Vec<GrammarIssue>,
    pub created_at: DateTime<Utc>,
}

impl GrammarFeedback {
    /// Build a feedback row from an analysis of `original_text`
    pub fn from_analysis(
        message_id: Uuid,
        original_text: impl Into<String>,
        analysis: &GrammarAnalysis,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            original_text: original_text.into(),
            corrected_text: analysis.corrected_sentence.clone(),
            has_errors: analysis.has_errors,
            errors: analysis.errors.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Aggregate error statistics over stored feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarStats {
    pub total_messages: i64,
    pub messages_with_errors: i64,
    pub error_rate: f64,
}
