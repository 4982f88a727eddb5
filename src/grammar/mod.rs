//! Grammar feedback domain

pub mod hub;
pub mod service;
pub mod types;

pub use hub::FeedbackHub;
pub use service::GrammarService;
pub use types::{ErrorKind, ErrorSpan, GrammarAnalysis, GrammarFeedback, GrammarIssue, GrammarStats};
