//! Grammar checking service
//!
//! Sends user text to the active LLM provider with a grammar-analysis prompt,
//! parses the structured reply, and persists the resulting feedback.

use std::sync::Arc;

use tracing::{error, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::grammar::hub::FeedbackHub;
use crate::grammar::types::{GrammarAnalysis, GrammarFeedback, GrammarStats};
use crate::llm::{ChatMessage, ChatRequest, LlmError, LlmProvider};
use crate::store::{self, Store};

const CHECK_MAX_TOKENS: u32 = 1000;
const CHECK_TEMPERATURE: f32 = 0.3;

/// Grammar checking and feedback persistence
#[derive(Clone)]
pub struct GrammarService {
    store: Store,
    provider: Arc<dyn LlmProvider>,
    settings: Arc<Settings>,
}

impl GrammarService {
    pub fn new(store: Store, provider: Arc<dyn LlmProvider>, settings: Arc<Settings>) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Analyze a sentence for grammar errors
    ///
    /// `previous_reply` is the assistant message the user was responding to;
    /// it gives the model context for judging word choice and expression.
    pub async fn check(
        &self,
        text: &str,
        previous_reply: Option<&str>,
    ) -> Result<GrammarAnalysis, LlmError> {
        let prompt = build_grammar_prompt(text, previous_reply);
        let request = ChatRequest {
            messages: vec![ChatMessage::user(prompt)],
            model: self.settings.model_for_provider().to_string(),
            max_tokens: CHECK_MAX_TOKENS,
            temperature: CHECK_TEMPERATURE,
        };

        let response = self.provider.chat_completion(request).await?;
        Ok(parse_grammar_response(&response.content))
    }

    /// Persist the analysis of a message
    pub async fn save_feedback(
        &self,
        message_id: Uuid,
        original_text: &str,
        analysis: &GrammarAnalysis,
    ) -> store::Result<GrammarFeedback> {
        let feedback = GrammarFeedback::from_analysis(message_id, original_text, analysis);
        self.store.insert_feedback(&feedback).await?;
        Ok(feedback)
    }

    /// Feedback stored for a message
    pub async fn feedback_for_message(&self, message_id: Uuid) -> store::Result<GrammarFeedback> {
        self.store.find_feedback(message_id).await
    }

    /// Aggregate error statistics over an optional trailing window of days
    pub async fn stats(&self, days: Option<i64>) -> store::Result<GrammarStats> {
        let (total, with_errors) = self.store.feedback_stats(days).await?;
        let error_rate = if total > 0 {
            with_errors as f64 / total as f64
        } else {
            0.0
        };
        Ok(GrammarStats {
            total_messages: total,
            messages_with_errors: with_errors,
            error_rate,
        })
    }

    /// Check a message in the background and publish the result
    ///
    /// The conversation flow must not wait for, or fail on, grammar analysis.
    /// The feedback row is persisted before the hub publish so a subscriber
    /// that misses the publish finds it in the database.
    pub fn spawn_check(
        &self,
        hub: FeedbackHub,
        message_id: Uuid,
        text: String,
        previous_reply: Option<String>,
    ) {
        let service = self.clone();
        tokio::spawn(async move {
            let analysis = match service.check(&text, previous_reply.as_deref()).await {
                Ok(analysis) => analysis,
                Err(err) => {
                    warn!(%message_id, "grammar check failed: {}", err);
                    return;
                }
            };
            match service.save_feedback(message_id, &text, &analysis).await {
                Ok(feedback) => hub.publish(message_id, feedback),
                Err(err) => error!(%message_id, "failed to store grammar feedback: {}", err),
            }
        });
    }
}

/// Build the grammar-analysis prompt for a sentence
pub fn build_grammar_prompt(text: &str, previous_reply: Option<&str>) -> String {
    let context = match previous_reply {
        Some(reply) => format!(
            "The sentence was written in reply to: \"{}\"\n\n",
            reply
        ),
        None => String::new(),
    };

    format!(
        r#"Analyze the following English sentence for grammar errors.

{context}Sentence: "{text}"

Respond in JSON format with:
{{
  "has_errors": boolean,
  "errors": [
    {{
      "type": "grammar|word_choice|expression|spelling|punctuation",
      "original": "incorrect text",
      "corrected": "correct text",
      "explanation": "brief explanation",
      "position": {{"start": int, "end": int}}
    }}
  ],
  "corrected_sentence": "fully corrected sentence",
  "overall_quality": float (0.0 to 1.0)
}}

If there are no errors, return has_errors: false and an empty errors array.
Keep explanations concise and helpful."#
    )
}

/// Parse the model's analysis reply
///
/// Malformed output degrades to a clean analysis; a bad model reply must not
/// fail the request that triggered the check.
pub fn parse_grammar_response(response: &str) -> GrammarAnalysis {
    let payload = extract_json_block(response);
    serde_json::from_str(payload).unwrap_or_else(|_| GrammarAnalysis::clean())
}

/// Strip a markdown code fence from around the JSON payload, if present
fn extract_json_block(response: &str) -> &str {
    if let Some((_, rest)) = response.split_once("```json") {
        rest.split("```").next().unwrap_or("").trim()
    } else if let Some((_, rest)) = response.split_once("```") {
        rest.split("```").next().unwrap_or("").trim()
    } else {
        response.trim()
    }
}

/// Parse a `time_range` query value into a day count
///
/// `"7d"` / `"30d"` / `"90d"` select a trailing window; `"all"` or absence
/// selects everything.
pub fn parse_time_range(time_range: Option<&str>) -> Result<Option<i64>, String> {
    match time_range {
        None => Ok(None),
        Some("all") => Ok(None),
        Some(raw) => raw
            .strip_suffix('d')
            .and_then(|days| days.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .map(Some)
            .ok_or_else(|| format!("invalid time range '{}' (expected e.g. 7d, 30d, all)", raw)),
    }
}
