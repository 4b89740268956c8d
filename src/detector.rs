//! Public IP detection.

use crate::config::Config;
use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Body returned by the IP service.
#[derive(Debug, Deserialize)]
struct IpResponse {
    #[serde(rename = "IP")]
    ip: String,
}

/// Looks up the caller's public IPv4 address from a single JSON endpoint.
pub struct IpResolver {
    client: reqwest::Client,
    url: String,
}

impl IpResolver {
    /// Create a resolver for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.ip_service_url.clone(), config.timeout())
    }

    /// The endpoint this resolver queries.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Resolve the public IPv4 address. One attempt, no retry.
    pub async fn resolve(&self) -> Result<Ipv4Addr> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Protocol(format!(
                "error response from {}: {}",
                self.url, status
            )));
        }

        let body = response.bytes().await?;
        let parsed: IpResponse = serde_json::from_slice(&body)?;
        let raw = parsed.ip.trim();

        let ip = raw
            .parse::<Ipv4Addr>()
            .map_err(|_| SyncError::Protocol(format!("Invalid IPv4 address: {:?}", raw)))?;

        tracing::debug!("Detected IPv4 {} from {}", ip, self.url);
        Ok(ip)
    }
}
