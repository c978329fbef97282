//! Error types for the casewriter domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all casewriter operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Instructor setup errors ---
    #[error("Instructor setup error: {0}")]
    Instructor(#[from] InstructorError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Response was blocked or empty: {0}")]
    EmptyResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Search quota exhausted")]
    QuotaExceeded,

    #[error("Malformed search response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum InstructorError {
    #[error("No instructor setup saved at {0}; run `casewriter instructor save` first")]
    NotFound(PathBuf),

    #[error("Instructor setup already saved at {0}; pass --force to replace it")]
    AlreadySaved(PathBuf),

    #[error("Failed to read instructor setup at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse instructor setup at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write instructor setup at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },
}
