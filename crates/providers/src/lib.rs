//! Hosted text-generation backends for casewriter.
//!
//! All providers implement the `casewriter_core::Provider` trait.
//! The router builds the configured one.

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
