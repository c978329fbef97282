//! Case study pipeline.
//!
//! Drafts a business-school case study by chaining prompts against a hosted
//! model, optionally fed with web search snippets:
//!
//! - [`generation`]: one prompt in, one reply out, conversation history threaded through
//! - [`sections`]: the static table of sections written in steps 4 to 10
//! - [`prompts`]: pure prompt builders
//! - [`decision`]: parsing the per-section "do I need to search?" answer
//! - [`results`]: the per-run step record
//! - [`collate`]: the final markdown document
//! - [`orchestrator`]: the ordered chain itself
//! - [`setup`]: building a writer from configuration

pub mod collate;
pub mod decision;
pub mod generation;
pub mod orchestrator;
pub mod prompts;
pub mod results;
pub mod sections;
pub mod setup;

#[cfg(test)]
mod test_support;

pub use collate::collate;
pub use decision::SearchDecision;
pub use generation::{GenerationClient, GenerationOutcome};
pub use orchestrator::{CaseWriter, RunContext, RunReport};
pub use results::{GenerationResults, StepEntry};
pub use sections::{SECTIONS, SectionSpec};
pub use setup::build_writer;
