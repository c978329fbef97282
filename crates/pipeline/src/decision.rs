//! Parsing the model's "do I need to search?" answer.
//!
//! The answer is expected to be a JSON object
//! `{"search_needed": bool, "queries": [string, ...]}`, possibly wrapped in
//! a markdown code fence. Anything else falls back to no search.

use serde::Deserialize;
use tracing::debug;

/// At most this many queries from one decision are issued.
pub const MAX_QUERIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchDecision {
    NoSearchNeeded,
    SearchNeeded(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    search_needed: bool,
    #[serde(default)]
    queries: Vec<String>,
}

impl SearchDecision {
    /// What a failed call or an unreadable answer turns into.
    pub fn fallback() -> Self {
        Self::NoSearchNeeded
    }

    /// Parse a raw model answer. Never fails.
    pub fn parse(answer: &str) -> Self {
        let cleaned = strip_code_fences(answer);

        let raw: RawDecision = match serde_json::from_str(&cleaned) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "Search decision was not valid JSON; skipping search");
                return Self::fallback();
            }
        };

        let queries: Vec<String> = raw
            .queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(MAX_QUERIES)
            .collect();

        if raw.search_needed && !queries.is_empty() {
            Self::SearchNeeded(queries)
        } else {
            Self::NoSearchNeeded
        }
    }
}

fn strip_code_fences(answer: &str) -> String {
    answer
        .trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}
