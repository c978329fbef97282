//! Provider router: selects the generation backend from configuration.

use std::collections::HashMap;
use std::sync::Arc;
use casewriter_config::{AppConfig, Credentials};
use casewriter_core::error::ProviderError;
use casewriter_core::provider::Provider;
use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Holds the configured providers and knows which one is the default.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Result<Arc<dyn Provider>, ProviderError> {
        self.providers
            .get(&self.default_provider)
            .cloned()
            .ok_or_else(|| ProviderError::NotConfigured(self.default_provider.clone()))
    }
}

/// Build the default provider from configuration and resolved credentials.
///
/// Per-provider `api_url` overrides are honored; the key always comes from
/// the resolved credentials.
pub fn build_from_config(config: &AppConfig, credentials: &Credentials) -> ProviderRouter {
    let name = config.default_provider.clone();
    let mut router = ProviderRouter::new(&name);

    let api_key = credentials.generation_api_key.clone().unwrap_or_default();
    let api_url = config.providers.get(&name).and_then(|p| p.api_url.clone());

    let provider: Arc<dyn Provider> = match name.as_str() {
        "gemini" | "google" => {
            let mut p = GeminiProvider::new(&api_key);
            if let Some(url) = api_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        _ => {
            let base_url = api_url.unwrap_or_else(|| default_base_url(&name));
            Arc::new(OpenAiCompatProvider::new(&name, &base_url, &api_key))
        }
    };

    router.register(name, provider);
    router
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            generation_api_key: Some("k".into()),
            search: None,
        }
    }

    #[test]
    fn default_is_only_the_named_provider() {
        let mut router = ProviderRouter::new("openrouter");
        assert!(matches!(
            router.default(),
            Err(ProviderError::NotConfigured(name)) if name == "openrouter"
        ));

        router.register(
            "groq",
            Arc::new(OpenAiCompatProvider::new("groq", default_base_url("groq"), "k")),
        );
        assert!(router.default().is_err());

        router.register(
            "openrouter",
            Arc::new(OpenAiCompatProvider::new("openrouter", default_base_url("openrouter"), "k")),
        );
        assert_eq!(router.default().unwrap().name(), "openrouter");
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").contains("openrouter.ai"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn default_config_builds_gemini() {
        let router = build_from_config(&AppConfig::default(), &creds());
        let provider = router.default().unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn other_providers_use_openai_compat() {
        let config = AppConfig {
            default_provider: "openai".into(),
            ..AppConfig::default()
        };
        let router = build_from_config(&config, &creds());
        assert_eq!(router.default().unwrap().name(), "openai");
    }
}
