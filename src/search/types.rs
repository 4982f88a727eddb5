//! Search result data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One shaped search hit returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub published_date: Option<DateTime<Utc>>,
    pub score: f64,
}

/// A completed search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub results: Vec<SearchResultItem>,
    pub timestamp: DateTime<Utc>,
}

/// Raw Tavily search hit
#[derive(Debug, Clone, Deserialize)]
pub struct TavilyResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// Raw Tavily API response
#[derive(Debug, Clone, Deserialize)]
pub struct TavilyResponse {
    #[serde(default)]
    pub results: Vec<TavilyResult>,
}
