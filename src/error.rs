//! Error types for route53-sync.

use thiserror::Error;

/// Result type alias for route53-sync.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that abort a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// IP service unreachable or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// IP service answered with something we cannot use.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed line in the hostnames file.
    #[error("Invalid config line {line}: {content:?}")]
    Format { line: usize, content: String },

    /// Settings file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_status() {
            SyncError::Protocol(e.to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(e: toml::de::Error) -> Self {
        SyncError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(e: toml::ser::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Protocol(e.to_string())
    }
}

