use std::convert::Infallible;

use serde_json::Value;
use warp::sse::Event;

use crate::grammar::types::GrammarFeedback;

/// Create a grammar_feedback SSE event carrying the feedback JSON
pub fn grammar_feedback_event(feedback: &GrammarFeedback) -> Result<Event, Infallible> {
    let payload = serde_json::to_value(feedback).unwrap_or(Value::Null);

    Ok(Event::default()
        .event("grammar_feedback")
        .data(payload.to_string()))
}

/// Create a done SSE event to signal stream completion
pub fn done_event() -> Result<Event, Infallible> {
    let payload = serde_json::json!({});

    Ok(Event::default().event("done").data(payload.to_string()))
}
