//! Per-zone record submission.

use crate::config::Config;
use crate::providers::{
    ChangeAction, ChangeBatch, ChangeInfo, ChangeRequest, ProviderError, RecordProvider,
    RecordType,
};
use std::net::Ipv4Addr;

/// Turns a zone's hostnames into an upsert batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchBuilder {
    ttl: u32,
    comment: String,
}

impl BatchBuilder {
    pub fn new(ttl: u32, comment: impl Into<String>) -> Self {
        Self {
            ttl,
            comment: comment.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ttl, config.comment.clone())
    }

    /// One A-record upsert per hostname, all pointing at `ip`.
    pub fn build(&self, hostnames: &[String], ip: Ipv4Addr) -> ChangeBatch {
        let value = ip.to_string();
        let changes = hostnames
            .iter()
            .map(|name| ChangeRequest {
                action: ChangeAction::Upsert,
                name: name.clone(),
                record_type: RecordType::A,
                ttl: self.ttl,
                value: value.clone(),
            })
            .collect();

        ChangeBatch {
            comment: self.comment.clone(),
            changes,
        }
    }
}

/// Builds one upsert batch per zone and submits it.
pub struct RecordUpdater<P> {
    provider: P,
    batches: BatchBuilder,
}

impl<P: RecordProvider> RecordUpdater<P> {
    pub fn new(provider: P, batches: BatchBuilder) -> Self {
        Self { provider, batches }
    }

    pub fn from_config(provider: P, config: &Config) -> Self {
        Self::new(provider, BatchBuilder::from_config(config))
    }

    pub fn batches(&self) -> &BatchBuilder {
        &self.batches
    }

    /// Submit the batch for `zone_id`.
    pub async fn update(
        &self,
        zone_id: &str,
        hostnames: &[String],
        ip: Ipv4Addr,
    ) -> Result<ChangeInfo, ProviderError> {
        let batch = self.batches.build(hostnames, ip);
        tracing::debug!(
            "Submitting {} change(s) to {} zone {}",
            batch.changes.len(),
            self.provider.name(),
            zone_id
        );

        let change = self.provider.change_record_sets(zone_id, &batch).await?;

        tracing::info!("{} {} {:?}", change, zone_id, hostnames);
        Ok(change)
    }
}
