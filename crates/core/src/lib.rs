//! # casewriter core
//!
//! Domain types, traits, and error definitions for the casewriter pipeline.
//! This crate has **no I/O dependencies** beyond reading and writing the
//! instructor setup: it defines the model every other crate builds on.
//!
//! The two hosted services the pipeline talks to are traits here
//! ([`Provider`] and [`SearchBackend`]); implementations live in
//! `casewriter-providers` and `casewriter-search`, and tests swap in
//! scripted stand-ins.

pub mod case;
pub mod error;
pub mod message;
pub mod provider;
pub mod search;

// Re-export key types at crate root for ergonomics
pub use case::{InstructorSpec, StudentSpec};
pub use error::{Error, Result};
pub use message::{ConversationHistory, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use search::{SearchBackend, SearchHit};
