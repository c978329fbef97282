//! Configuration loading, validation, and credential resolution for casewriter.
//!
//! Loads configuration from `~/.casewriter/config.toml` with environment
//! variable overrides. Credentials are resolved separately (see [`secrets`])
//! so that a missing key is reported by name before any run starts.

pub mod secrets;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use secrets::{Credentials, SearchCredentials, SecretResolver, SecretSource};

/// The root configuration structure.
///
/// Maps directly to `~/.casewriter/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Where the instructor setup is saved (defaults to the config dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_file: Option<PathBuf>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    8192
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("providers", &self.providers)
            .field("search", &self.search)
            .field("pipeline", &self.pipeline)
            .field("instructor_file", &self.instructor_file)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hits requested per query
    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,

    /// Custom Search JSON API endpoint
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
}

fn default_results_per_query() -> u32 {
    3
}
fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_per_query: default_results_per_query(),
            endpoint: default_search_endpoint(),
            api_key: None,
            engine_id: None,
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("results_per_query", &self.results_per_query)
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub variant: PipelineVariant,

    #[serde(default)]
    pub persona_mode: PersonaMode,

    #[serde(default)]
    pub on_section_failure: SectionFailurePolicy,

    /// Whether the final document carries the "written by <model>" line
    #[serde(default = "default_true")]
    pub disclaimer: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variant: PipelineVariant::default(),
            persona_mode: PersonaMode::default(),
            on_section_failure: SectionFailurePolicy::default(),
            disclaimer: true,
        }
    }
}

/// Which chain a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// Model only, no web search
    Basic,
    /// An initial search battery feeds the research report
    Researched,
    /// Initial search plus a per-section "do I need to search?" decision
    #[default]
    Agentic,
}

impl PipelineVariant {
    pub fn uses_search(self) -> bool {
        !matches!(self, Self::Basic)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Researched => "researched",
            Self::Agentic => "agentic",
        }
    }
}

impl FromStr for PipelineVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "researched" => Ok(Self::Researched),
            "agentic" => Ok(Self::Agentic),
            other => Err(ConfigError::ValidationError(format!(
                "unknown pipeline variant '{other}' (expected basic, researched or agentic)"
            ))),
        }
    }
}

impl std::fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the writer persona enters the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaMode {
    /// Seed the history with the persona prompt and a fixed acknowledgment
    #[default]
    Seeded,
    /// Send the persona prompt to the model and keep its real reply
    Generated,
}

/// What the section loop does when one section comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionFailurePolicy {
    /// Record the gap and keep writing the remaining sections
    #[default]
    Continue,
    /// Stop writing sections; collate what exists
    Halt,
}

impl AppConfig {
    /// Load configuration from the default path (~/.casewriter/config.toml).
    ///
    /// Environment overrides:
    /// - `CASEWRITER_PROVIDER`
    /// - `CASEWRITER_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(provider) = std::env::var("CASEWRITER_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("CASEWRITER_MODEL") {
            config.override_model(model);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".casewriter")
    }

    /// Path of the deployment secret store.
    pub fn secrets_path() -> PathBuf {
        Self::config_dir().join("secrets.toml")
    }

    /// Where the instructor setup lives.
    pub fn instructor_path(&self) -> PathBuf {
        self.instructor_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("instructor.toml"))
    }

    /// The model requests are sent with: the default provider's own
    /// `default_model` when set, otherwise the top-level one.
    pub fn active_model(&self) -> &str {
        self.providers
            .get(&self.default_provider)
            .and_then(|p| p.default_model.as_deref())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.default_model)
    }

    /// Force `model` for this run, above any per-provider setting.
    pub fn override_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        if let Some(provider) = self.providers.get_mut(&self.default_provider) {
            provider.default_model = Some(model.clone());
        }
        self.default_model = model;
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.search.results_per_query == 0 || self.search.results_per_query > 10 {
            return Err(ConfigError::ValidationError(
                "search.results_per_query must be between 1 and 10".into(),
            ));
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            search: SearchConfig::default(),
            pipeline: PipelineConfig::default(),
            instructor_file: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Required secret {name} is missing (checked: {checked})")]
    MissingSecret { name: String, checked: String },
}
