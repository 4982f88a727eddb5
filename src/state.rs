//! Shared application state threaded through the warp filters

use std::sync::Arc;

use crate::config::Settings;
use crate::grammar::FeedbackHub;
use crate::llm::LlmProvider;
use crate::search::SearchClient;
use crate::store::Store;

/// Everything a request handler needs; cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub provider: Arc<dyn LlmProvider>,
    /// Absent when no Tavily key is configured
    pub search: Option<SearchClient>,
    pub hub: FeedbackHub,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        store: Store,
        provider: Arc<dyn LlmProvider>,
        search: Option<SearchClient>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            store,
            provider,
            search,
            hub: FeedbackHub::new(),
            settings,
        }
    }
}
