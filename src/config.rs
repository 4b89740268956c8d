//! Configuration management for route53-sync.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL of the service that reports the caller's public IP as `{"IP": "..."}`.
    #[serde(default = "default_ip_service_url")]
    pub ip_service_url: String,

    /// Path of the `zoneId,hostname` file.
    #[serde(default = "default_hostnames_path")]
    pub hostnames_path: PathBuf,

    /// TTL of the upserted A records, in seconds (default: 600).
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Comment attached to every change batch.
    #[serde(default = "default_comment")]
    pub comment: String,

    /// Timeout of the IP lookup in milliseconds (default: 1000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// AWS region override. The SDK's provider chain is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

fn default_ip_service_url() -> String {
    "http://abandonedfactory.net/tools/myip.php".to_string()
}

fn default_hostnames_path() -> PathBuf {
    PathBuf::from("hostnames.csv")
}

fn default_ttl() -> u32 {
    600
}

fn default_comment() -> String {
    "Dynamic DNS update from route53-sync".to_string()
}

fn default_timeout_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip_service_url: default_ip_service_url(),
            hostnames_path: default_hostnames_path(),
            ttl: default_ttl(),
            comment: default_comment(),
            timeout_ms: default_timeout_ms(),
            region: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("route53-sync").join("config.toml"))
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate example configuration.
    pub fn example() -> Self {
        Self {
            region: Some("us-east-1".to_string()),
            ..Self::default()
        }
    }

    /// Timeout of the IP lookup.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.ip_service_url.trim().is_empty() {
            return Err(SyncError::Config("ip_service_url is empty".to_string()));
        }
        if self.ttl == 0 {
            return Err(SyncError::Config("ttl must be greater than 0".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(SyncError::Config(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
