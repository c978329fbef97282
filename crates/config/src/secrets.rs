//! Credential resolution.
//!
//! Secrets are looked up by name across an ordered list of sources. The
//! standard order is: process environment, a `.env` file in the working
//! directory, explicit values in `config.toml`, and finally the deployment
//! secret store (`~/.casewriter/secrets.toml`). The first source holding a
//! non-empty value wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{AppConfig, ConfigError};

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const GENERIC_API_KEY: &str = "CASEWRITER_API_KEY";
pub const GOOGLE_SEARCH_API_KEY: &str = "GOOGLE_SEARCH_API_KEY";
pub const SEARCH_ENGINE_ID: &str = "SEARCH_ENGINE_ID";

/// Somewhere a named secret might be stored.
pub trait SecretSource: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment.
pub struct EnvSource;

impl SecretSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory set of values, used for config-file entries.
pub struct StaticSource {
    name: String,
    values: HashMap<String, String>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, values: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// The secrets written directly into `config.toml`, under their canonical names.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut values = HashMap::new();

        let provider_key = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| config.api_key.clone());
        if let (Some(name), Some(value)) = (generation_key_name(&config.default_provider), provider_key) {
            values.insert(name.to_string(), value);
        }
        if let Some(key) = &config.search.api_key {
            values.insert(GOOGLE_SEARCH_API_KEY.to_string(), key.clone());
        }
        if let Some(id) = &config.search.engine_id {
            values.insert(SEARCH_ENGINE_ID.to_string(), id.clone());
        }

        Self::new("config.toml", values)
    }
}

impl SecretSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A `.env` file, read without touching the process environment.
pub struct DotenvFile {
    label: String,
    values: HashMap<String, String>,
}

impl DotenvFile {
    /// Read `path`. A missing file yields an empty source; malformed lines are skipped.
    pub fn load(path: &Path) -> Self {
        let mut values = HashMap::new();

        match dotenv::from_path_iter(path) {
            Ok(iter) => {
                for item in iter {
                    match item {
                        Ok((key, value)) => {
                            values.insert(key, value);
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Skipping malformed .env line");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No .env file loaded");
            }
        }

        Self {
            label: path.display().to_string(),
            values,
        }
    }
}

impl SecretSource for DotenvFile {
    fn name(&self) -> &str {
        &self.label
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// The deployment secret store: a flat TOML table of `KEY = "value"` pairs.
pub struct SecretsFile {
    path: PathBuf,
    label: String,
    values: HashMap<String, String>,
}

impl SecretsFile {
    /// Load the store. A missing file is an empty store, not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut store = Self {
            path: path.to_path_buf(),
            label: path.display().to_string(),
            values: HashMap::new(),
        };

        if !path.exists() {
            return Ok(store);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for (key, value) in table {
            match value {
                toml::Value::String(s) => {
                    store.values.insert(key, s);
                }
                _ => tracing::debug!(key = %key, path = %store.path.display(), "Ignoring non-string secret"),
            }
        }

        Ok(store)
    }
}

impl SecretSource for SecretsFile {
    fn name(&self) -> &str {
        &self.label
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Looks secrets up across sources in priority order.
#[derive(Default)]
pub struct SecretResolver {
    sources: Vec<Box<dyn SecretSource>>,
}

impl SecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with lower priority than every source added before it.
    pub fn with_source(mut self, source: Box<dyn SecretSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Local overrides first (env, `./.env`, `config.toml`), then the secret store.
    pub fn standard(config: &AppConfig) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_default();
        Ok(Self::new()
            .with_source(Box::new(EnvSource))
            .with_source(Box::new(DotenvFile::load(&cwd.join(".env"))))
            .with_source(Box::new(StaticSource::from_config(config)))
            .with_source(Box::new(SecretsFile::load(&AppConfig::secrets_path())?)))
    }

    /// The first non-empty value for `key`.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.sources.iter().find_map(|source| {
            source
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.lookup(key).ok_or_else(|| ConfigError::MissingSecret {
            name: key.to_string(),
            checked: self.checked(),
        })
    }

    /// Names of the consulted sources, in order.
    pub fn checked(&self) -> String {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        if names.is_empty() {
            "no sources".into()
        } else {
            names.join(", ")
        }
    }
}

/// The secret name holding the generation key for a provider, if it needs one.
pub fn generation_key_name(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" | "google" => Some(GEMINI_API_KEY),
        "openai" => Some(OPENAI_API_KEY),
        "openrouter" => Some(OPENROUTER_API_KEY),
        "ollama" | "vllm" | "llamacpp" | "llama.cpp" => None,
        _ => Some(GENERIC_API_KEY),
    }
}

/// Keys for the web-search endpoint.
#[derive(Clone)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"[REDACTED]")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Everything a run needs to talk to the hosted services.
#[derive(Clone)]
pub struct Credentials {
    /// `None` only for keyless local providers
    pub generation_api_key: Option<String>,
    pub search: Option<SearchCredentials>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "generation_api_key",
                &self.generation_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("search", &self.search)
            .finish()
    }
}

impl Credentials {
    /// Resolve every secret the run needs. The first missing one is fatal.
    pub fn resolve(
        provider: &str,
        needs_search: bool,
        resolver: &SecretResolver,
    ) -> Result<Self, ConfigError> {
        let generation_api_key = match generation_key_name(provider) {
            Some(name) => Some(resolver.require(name)?),
            None => None,
        };

        let search = if needs_search {
            Some(SearchCredentials {
                api_key: resolver.require(GOOGLE_SEARCH_API_KEY)?,
                engine_id: resolver.require(SEARCH_ENGINE_ID)?,
            })
        } else {
            None
        };

        Ok(Self {
            generation_api_key,
            search,
        })
    }
}
