//! Wires a [`CaseWriter`] from configuration and resolved credentials.

use std::sync::Arc;

use casewriter_config::{AppConfig, Credentials};
use casewriter_core::error::Result;
use casewriter_search::{GoogleCustomSearch, SearchClient};

use crate::generation::GenerationClient;
use crate::orchestrator::CaseWriter;

/// Build the writer `casewriter run` executes.
///
/// The model is [`AppConfig::active_model`]. A search client is attached
/// only when search credentials were resolved.
pub fn build_writer(config: &AppConfig, credentials: &Credentials) -> Result<CaseWriter> {
    let router = casewriter_providers::build_from_config(config, credentials);
    let provider = router.default()?;

    let generation = GenerationClient::new(provider, config.active_model())
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);

    let mut writer = CaseWriter::new(generation, config.pipeline.clone());
    if let Some(search) = &credentials.search {
        let backend = GoogleCustomSearch::new(&search.api_key, &search.engine_id)
            .with_endpoint(&config.search.endpoint);
        writer = writer.with_search(
            SearchClient::new(Arc::new(backend)),
            config.search.results_per_query,
        );
    }
    Ok(writer)
}
