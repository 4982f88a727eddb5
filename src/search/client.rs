//! Tavily web-search client

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::search::types::{SearchResult, SearchResultItem, TavilyResponse};

const TAVILY_URL: &str = "https://api.tavily.com/search";
const SNIPPET_CHARS: usize = 200;
const MAX_RESULTS: u32 = 5;

/// Errors that can occur when searching
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// Request could not be sent
    #[error("Request error: {0}")]
    RequestError(String),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SearchError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            SearchError::RequestError(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

/// Client for the Tavily search API
#[derive(Clone)]
pub struct SearchClient {
    http_client: Client,
    api_key: String,
}

impl SearchClient {
    /// Create a new search client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: String) -> Result<Self, SearchError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SearchError::RequestError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Run a search and shape the results for clients
    pub async fn search(&self, query: &str) -> Result<SearchResult, SearchError> {
        let response = self
            .http_client
            .post(TAVILY_URL)
            .header("Content-Type", "application/json")
            .json(&TavilyRequest {
                api_key: &self.api_key,
                query,
                search_depth: "basic",
                max_results: MAX_RESULTS,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(SearchError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let tavily: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::SerializationError(e.to_string()))?;

        Ok(format_search_results(query, tavily))
    }
}

/// Search query for conversation topics
pub fn build_search_query(topic: &str) -> String {
    format!("{} latest news", topic)
}

/// Shape a raw Tavily response into the client-facing result
pub fn format_search_results(query: &str, tavily: TavilyResponse) -> SearchResult {
    let results = tavily
        .results
        .into_iter()
        .map(|item| {
            let published_date = item
                .published_date
                .as_deref()
                .and_then(parse_published_date);

            SearchResultItem {
                title: item.title,
                url: item.url,
                snippet: truncate_chars(&item.content, SNIPPET_CHARS),
                published_date,
                score: item.score,
            }
        })
        .collect();

    SearchResult {
        query: query.to_string(),
        results,
        timestamp: Utc::now(),
    }
}

fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// Character-based, not byte-based; snippets must never split a code point
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::TavilyResult;

    fn tavily_hit(content: &str, published_date: Option<&str>) -> TavilyResult {
        TavilyResult {
            title: "A title".to_string(),
            url: "https://example.com".to_string(),
            content: content.to_string(),
            score: 0.87,
            published_date: published_date.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_build_search_query() {
        assert_eq!(build_search_query("space travel"), "space travel latest news");
    }

    #[test]
    fn test_format_truncates_snippet() {
        let long_content = "x".repeat(500);
        let tavily = TavilyResponse {
            results: vec![tavily_hit(&long_content, None)],
        };
        let result = format_search_results("q", tavily);
        assert_eq!(result.results[0].snippet.chars().count(), 200);
    }

    #[test]
    fn test_format_handles_multibyte_content() {
        let content = "안녕하세요 ".repeat(100);
        let tavily = TavilyResponse {
            results: vec![tavily_hit(&content, None)],
        };
        let result = format_search_results("q", tavily);
        assert_eq!(result.results[0].snippet.chars().count(), 200);
    }

    #[test]
    fn test_format_parses_zulu_dates() {
        let tavily = TavilyResponse {
            results: vec![tavily_hit("content", Some("2025-06-01T12:00:00Z"))],
        };
        let result = format_search_results("q", tavily);
        let date = result.results[0].published_date.unwrap();
        assert_eq!(date.to_rfc3339(), "2025-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_format_drops_unparseable_dates() {
        let tavily = TavilyResponse {
            results: vec![tavily_hit("content", Some("June 1st, 2025"))],
        };
        let result = format_search_results("q", tavily);
        assert!(result.results[0].published_date.is_none());
    }

    #[test]
    fn test_format_preserves_query_and_score() {
        let tavily = TavilyResponse {
            results: vec![tavily_hit("content", None)],
        };
        let result = format_search_results("rust news", tavily);
        assert_eq!(result.query, "rust news");
        assert!((result.results[0].score - 0.87).abs() < 1e-9);
    }

    #[test]
    fn test_tavily_response_deserialization() {
        let raw = r#"{
            "query": "rust",
            "results": [
                {"title": "t", "url": "u", "content": "c", "score": 0.5},
                {"title": "t2", "url": "u2", "content": "c2", "score": 0.4, "published_date": "2025-01-01T00:00:00Z"}
            ]
        }"#;
        let parsed: TavilyResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[1].published_date.as_deref(), Some("2025-01-01T00:00:00Z"));
    }
}
