//! DNS provider seam.

mod route53;

pub use route53::Route53Provider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Kind of mutation applied to a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Upsert,
}

/// DNS record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordType {
    A,
}

/// One record-set change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRequest {
    pub action: ChangeAction,
    pub name: String,
    pub record_type: RecordType,
    pub ttl: u32,
    pub value: String,
}

/// Changes for one hosted zone, submitted in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeBatch {
    pub comment: String,
    pub changes: Vec<ChangeRequest>,
}

/// Provider's summary of an accepted change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: String,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl fmt::Display for ChangeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "change {} {}", self.id, self.status)?;
        if let Some(at) = self.submitted_at {
            write!(f, " (submitted {})", at.format("%Y-%m-%d %H:%M:%S"))?;
        }
        Ok(())
    }
}

/// Classified provider failure for one zone's batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("NoSuchHostedZone: {0}")]
    NoSuchHostedZone(String),

    #[error("NoSuchHealthCheck: {0}")]
    NoSuchHealthCheck(String),

    #[error("InvalidChangeBatch: {0}")]
    InvalidChangeBatch(String),

    #[error("InvalidInput: {0}")]
    InvalidInput(String),

    #[error("PriorRequestNotComplete: {0}")]
    PriorRequestNotComplete(String),

    /// The service answered with a code we don't recognize.
    #[error("{code}: {message}")]
    Unknown { code: String, message: String },

    /// The request never got a service answer (credentials, connection, ...).
    #[error("Failed to change record sets: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Map a provider error code and message to its variant.
    pub fn from_code(code: Option<&str>, message: Option<&str>) -> Self {
        let message = message.unwrap_or_default().to_string();
        match code {
            Some("NoSuchHostedZone") => ProviderError::NoSuchHostedZone(message),
            Some("NoSuchHealthCheck") => ProviderError::NoSuchHealthCheck(message),
            Some("InvalidChangeBatch") => ProviderError::InvalidChangeBatch(message),
            Some("InvalidInput") => ProviderError::InvalidInput(message),
            Some("PriorRequestNotComplete") => ProviderError::PriorRequestNotComplete(message),
            other => ProviderError::Unknown {
                code: other.unwrap_or("Unknown").to_string(),
                message,
            },
        }
    }

    /// Provider error code, as the service names it.
    pub fn code(&self) -> &str {
        match self {
            ProviderError::NoSuchHostedZone(_) => "NoSuchHostedZone",
            ProviderError::NoSuchHealthCheck(_) => "NoSuchHealthCheck",
            ProviderError::InvalidChangeBatch(_) => "InvalidChangeBatch",
            ProviderError::InvalidInput(_) => "InvalidInput",
            ProviderError::PriorRequestNotComplete(_) => "PriorRequestNotComplete",
            ProviderError::Unknown { code, .. } => code,
            ProviderError::Transport(_) => "Transport",
        }
    }
}

/// A DNS service that accepts batched record-set changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &'static str;

    /// Apply `batch` atomically to the hosted zone `zone_id`.
    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> std::result::Result<ChangeInfo, ProviderError>;
}
