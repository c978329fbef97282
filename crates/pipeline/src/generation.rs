//! Generation client: one prompt in, one reply out, history threaded through.
//!
//! Two calling modes:
//! - **stateless** (`history = None`): the provider sees only the prompt and
//!   the returned history is the two-turn seed `(prompt, reply)`
//! - **continuation** (`history = Some(..)`): the provider sees every prior
//!   turn plus the prompt and the returned history is the prior one extended
//!   by exactly one `(prompt, reply)` pair
//!
//! Provider failures never escape: they are logged and reported as a missing
//! reply with the caller's history untouched.

use std::sync::Arc;

use casewriter_core::message::{ConversationHistory, Message};
use casewriter_core::provider::{Provider, ProviderRequest};
use tracing::{debug, warn};

/// What a single `generate` call produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The reply, or `None` when the call failed
    pub text: Option<String>,
    /// The history to carry into the next continuation call
    pub history: ConversationHistory,
}

impl GenerationOutcome {
    pub fn succeeded(&self) -> bool {
        self.text.is_some()
    }
}

/// Thin wrapper that pins a provider to one model and sampling setup.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The model name every request is sent with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt`, optionally continuing `history`.
    pub async fn generate(
        &self,
        prompt: &str,
        history: Option<&ConversationHistory>,
    ) -> GenerationOutcome {
        let mut messages: Vec<Message> = history
            .map(|h| h.messages().to_vec())
            .unwrap_or_default();
        messages.push(Message::user(prompt));

        let mut request = ProviderRequest::new(&self.model, messages);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            prior_turns = history.map_or(0, |h| h.len()),
            "Generating"
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                let reply = response.message.content;
                let history = match history {
                    Some(prior) => {
                        let mut extended = prior.clone();
                        extended.push_exchange(prompt, reply.as_str());
                        extended
                    }
                    None => ConversationHistory::seeded(prompt, reply.as_str()),
                };
                GenerationOutcome {
                    text: Some(reply),
                    history,
                }
            }
            Err(e) => {
                warn!(
                    provider = %self.provider.name(),
                    model = %self.model,
                    "An error occurred with the generation API: {e}"
                );
                GenerationOutcome {
                    text: None,
                    history: history.cloned().unwrap_or_default(),
                }
            }
        }
    }
}
