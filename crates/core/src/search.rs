//! SearchBackend trait: the abstraction over hosted web-search endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;

/// One hit returned by a web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A hosted keyword-search endpoint.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "google_cse").
    fn name(&self) -> &str;

    /// Run one query, returning at most `num_results` hits in ranking order.
    async fn query(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, SearchError>;
}
