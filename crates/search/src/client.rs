//! Batch search: run several queries, drop repeated URLs, render one text block.

use std::collections::HashSet;
use std::sync::Arc;

use casewriter_core::search::{SearchBackend, SearchHit};
use tracing::{error, info};

/// Returned for the whole batch when any single query fails.
pub const SEARCH_FAILED: &str = "Search failed.";

/// Returned when the batch succeeded but produced no hits.
pub const NO_RESULTS: &str = "No new search results found.";

/// What one batch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Unique hits in first-seen order
    Hits(Vec<SearchHit>),
    Empty,
    Failed,
}

impl SearchOutcome {
    /// The text block handed to prompts.
    pub fn to_text(&self) -> String {
        match self {
            Self::Hits(hits) => format_hits(hits),
            Self::Empty => NO_RESULTS.to_string(),
            Self::Failed => SEARCH_FAILED.to_string(),
        }
    }
}

/// One record per hit: title, URL and snippet.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            format!(
                "- Title: {}\n  URL: {}\n  Snippet: {}\n",
                hit.title, hit.url, hit.snippet
            )
        })
        .collect()
}

/// Runs query batches against a [`SearchBackend`].
#[derive(Clone)]
pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
}

impl SearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Issue every query in order and merge the hits.
    ///
    /// A URL seen in an earlier query of the same batch is dropped from later
    /// ones. The first failing query aborts the batch.
    pub async fn collect(&self, queries: &[String], results_per_query: u32) -> SearchOutcome {
        let mut seen: HashSet<String> = HashSet::new();
        let mut hits = Vec::new();

        for query in queries {
            info!("Searching for: \"{query}\"");
            match self.backend.query(query, results_per_query).await {
                Ok(results) => {
                    for hit in results {
                        if seen.insert(hit.url.clone()) {
                            hits.push(hit);
                        }
                    }
                }
                Err(e) => {
                    error!(backend = %self.backend.name(), query = %query, "An error occurred during web search: {e}");
                    return SearchOutcome::Failed;
                }
            }
        }

        if hits.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Hits(hits)
        }
    }

    /// [`collect`](Self::collect), rendered as prompt text.
    pub async fn search(&self, queries: &[String], results_per_query: u32) -> String {
        self.collect(queries, results_per_query).await.to_text()
    }
}
