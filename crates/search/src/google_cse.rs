//! Google Custom Search JSON API backend.
//!
//! `GET {endpoint}?key=..&cx=..&q=..&num=..` returning `items[]` with
//! `title`, `link` and `snippet`. A query with no hits has no `items` key.

use async_trait::async_trait;
use casewriter_core::error::SearchError;
use casewriter_core::search::{SearchBackend, SearchHit};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API caps `num` at 10.
const MAX_RESULTS: u32 = 10;

pub struct GoogleCustomSearch {
    endpoint: String,
    api_key: String,
    engine_id: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GoogleCustomSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCustomSearch")
            .field("endpoint", &self.endpoint)
            .field("engine_id", &self.engine_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GoogleCustomSearch {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            client,
        }
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for GoogleCustomSearch {
    fn name(&self) -> &str {
        "google_cse"
    }

    async fn query(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, SearchError> {
        let num = num_results.clamp(1, MAX_RESULTS).to_string();

        debug!(query = %query, num = %num, "Sending custom search request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(SearchError::QuotaExceeded);
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Custom search returned error");
            return Err(SearchError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let body: CseResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let url = item.link.filter(|l| !l.is_empty())?;
                Some(SearchHit {
                    title: item.title.unwrap_or_default(),
                    url,
                    snippet: item.snippet.unwrap_or_default(),
                })
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}
