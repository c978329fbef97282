//! Web search for casewriter.
//!
//! [`GoogleCustomSearch`] talks to the hosted endpoint one query at a time;
//! [`SearchClient`] runs a batch of queries, deduplicates hits by URL and
//! renders them as the text block the prompts embed.

pub mod client;
pub mod google_cse;

pub use client::{NO_RESULTS, SEARCH_FAILED, SearchClient, SearchOutcome, format_hits};
pub use google_cse::GoogleCustomSearch;
