//! Hostname list loading and zone grouping.
//!
//! The hostnames file holds one `zoneId,hostname` pair per line:
//!
//! ```text
//! Z0123456789ABC, home.example.com
//! Z0123456789ABC, vpn.example.com
//! ZFEDCBA9876543, example.org
//! ```

use crate::error::{Result, SyncError};
use std::collections::BTreeMap;
use std::path::Path;

/// One `zoneId,hostname` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameEntry {
    pub zone_id: String,
    pub hostname: String,
}

impl HostnameEntry {
    pub fn new(zone_id: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            hostname: hostname.into(),
        }
    }
}

/// Hostnames keyed by hosted zone id, in input order within each zone.
pub type ZoneChangeSet = BTreeMap<String, Vec<String>>;

/// Read and parse the hostnames file at `path`.
pub fn load(path: &Path) -> Result<Vec<HostnameEntry>> {
    let content = std::fs::read_to_string(path)?;
    let entries = parse(&content)?;
    tracing::debug!("Loaded {} hostnames from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse hostnames file content. Fails on the first malformed line.
///
/// Blank lines and `#` comments are skipped.
pub fn parse(content: &str) -> Result<Vec<HostnameEntry>> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let invalid = || SyncError::Format {
            line: idx + 1,
            content: line.to_string(),
        };

        let tokens: Vec<&str> = line.split(',').collect();
        let [zone_id, hostname] = tokens.as_slice() else {
            return Err(invalid());
        };

        let (zone_id, hostname) = (zone_id.trim(), hostname.trim());
        if zone_id.is_empty() || hostname.is_empty() {
            return Err(invalid());
        }

        entries.push(HostnameEntry::new(zone_id, hostname));
    }

    Ok(entries)
}

/// Group hostnames by zone. Duplicates are kept.
pub fn group(entries: &[HostnameEntry]) -> ZoneChangeSet {
    let mut zones = ZoneChangeSet::new();
    for entry in entries {
        zones
            .entry(entry.zone_id.clone())
            .or_default()
            .push(entry.hostname.clone());
    }
    zones
}
