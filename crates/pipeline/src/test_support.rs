//! Shared test doubles for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use casewriter_core::error::{ProviderError, SearchError};
use casewriter_core::message::Message;
use casewriter_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use casewriter_core::search::{SearchBackend, SearchHit};

/// A mock provider that returns scripted replies in order and records every
/// request it was sent.
///
/// A `None` entry in the script fails that call. Panics if more calls are
/// made than replies provided.
pub struct RecordingProvider {
    script: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    always_fail: bool,
}

impl RecordingProvider {
    pub fn new(script: Vec<Option<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            always_fail: false,
        }
    }

    /// Every call succeeds with the next reply.
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Some(r.into())).collect())
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The last user turn of every request, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.messages.last().map(|m| m.content.clone()))
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        if self.always_fail {
            return Err(ProviderError::Network("connection refused".into()));
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Some(text)) => Ok(text_response(&text)),
            Some(None) => Err(ProviderError::ApiError {
                status_code: 500,
                message: "scripted failure".into(),
            }),
            None => panic!("RecordingProvider: no more replies (call #{call})"),
        }
    }
}

pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A search backend serving canned hits keyed by query text.
///
/// Unknown queries return no hits. Every query is recorded.
#[derive(Default)]
pub struct StaticSearch {
    hits: HashMap<String, Vec<SearchHit>>,
    fail_all: bool,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, query: &str, urls: &[&str]) -> Self {
        self.hits.insert(query.to_string(), urls.iter().map(|u| hit(u)).collect());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for StaticSearch {
    fn name(&self) -> &str {
        "static_mock"
    }

    async fn query(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail_all {
            return Err(SearchError::QuotaExceeded);
        }
        Ok(self
            .hits
            .get(query)
            .map(|h| h.iter().take(num_results as usize).cloned().collect())
            .unwrap_or_default())
    }
}

pub fn hit(url: &str) -> SearchHit {
    SearchHit {
        title: format!("Page at {url}"),
        url: url.to_string(),
        snippet: format!("Snippet from {url}"),
    }
}
