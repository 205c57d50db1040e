//! Error types for navigation synchronization.

use thiserror::Error;

/// Errors raised while talking to the document store or assembling navigation data.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Snapshot error at {location}: {message}")]
    Snapshot { location: String, message: String },

    #[error("Section not configured: {0}")]
    UnknownSection(String),

    #[error("No navigation data available for section {section}")]
    NoData { section: String },

    #[error("Node {id} not found in section {section}")]
    NodeNotFound { section: String, id: String },
}

impl NavError {
    /// Whether a fresh attempt of the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            NavError::Transport { .. } | NavError::Timeout { .. } => true,
            NavError::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            NavError::ConfigError(_)
            | NavError::InvalidUrl { .. }
            | NavError::Decode { .. }
            | NavError::Snapshot { .. }
            | NavError::UnknownSection(_)
            | NavError::NoData { .. }
            | NavError::NodeNotFound { .. } => false,
        }
    }
}

impl From<config::ConfigError> for NavError {
    fn from(err: config::ConfigError) -> Self {
        NavError::ConfigError(err.to_string())
    }
}
