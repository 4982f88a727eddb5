//! Web search domain

pub mod client;
pub mod types;

pub use client::{build_search_query, SearchClient, SearchError};
pub use types::{SearchResult, SearchResultItem};
