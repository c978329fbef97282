//! Message and conversation history types.
//!
//! A run builds one [`ConversationHistory`] as it walks the pipeline:
//! persona seed → outline → sections. Each continuation call extends it by
//! exactly one user/assistant pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The prompting side (the pipeline)
    User,
    /// The model
    Assistant,
    /// System instructions
    System,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }
}

/// Ordered conversation turns carried between continuation calls.
///
/// Only ever grows: there is no API for removing or rewriting turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// A two-turn history: the prompt and the model's reply.
    pub fn seeded(prompt: impl Into<String>, reply: impl Into<String>) -> Self {
        let mut history = Self::new();
        history.push_exchange(prompt, reply);
        history
    }

    /// Append a user turn followed by an assistant turn.
    pub fn push_exchange(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        self.messages.push(Message::user(prompt));
        self.messages.push(Message::assistant(reply));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
