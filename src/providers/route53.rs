//! Amazon Route 53 provider.

use super::{ChangeAction, ChangeBatch, ChangeInfo, ProviderError, RecordProvider, RecordType};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_route53::config::Region;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_route53::types as r53;
use aws_sdk_route53::Client;

/// Route 53 provider backed by the AWS SDK.
pub struct Route53Provider {
    client: Client,
}

impl Route53Provider {
    /// Wrap an existing SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS provider chain, optionally pinning the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;
        Self::new(Client::new(&shared))
    }
}

fn to_route53_change(change: &super::ChangeRequest) -> Result<r53::Change, BuildError> {
    let action = match change.action {
        ChangeAction::Upsert => r53::ChangeAction::Upsert,
    };
    let record_type = match change.record_type {
        RecordType::A => r53::RrType::A,
    };

    let record_set = r53::ResourceRecordSet::builder()
        .name(&change.name)
        .r#type(record_type)
        .ttl(i64::from(change.ttl))
        .resource_records(r53::ResourceRecord::builder().value(&change.value).build()?)
        .build()?;

    r53::Change::builder()
        .action(action)
        .resource_record_set(record_set)
        .build()
}

fn to_route53_batch(batch: &ChangeBatch) -> Result<r53::ChangeBatch, BuildError> {
    let changes = batch
        .changes
        .iter()
        .map(to_route53_change)
        .collect::<Result<Vec<_>, _>>()?;

    r53::ChangeBatch::builder()
        .comment(&batch.comment)
        .set_changes(Some(changes))
        .build()
}

fn to_change_info(info: &r53::ChangeInfo) -> ChangeInfo {
    let submitted = info.submitted_at();
    ChangeInfo {
        id: info.id().to_string(),
        status: info.status().as_str().to_string(),
        submitted_at: chrono::DateTime::from_timestamp(submitted.secs(), submitted.subsec_nanos()),
    }
}

#[async_trait]
impl RecordProvider for Route53Provider {
    fn name(&self) -> &'static str {
        "route53"
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, ProviderError> {
        let change_batch = to_route53_batch(batch)
            .map_err(|e| ProviderError::InvalidInput(e.to_string()))?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(change_batch)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(service_err) => {
                    ProviderError::from_code(service_err.code(), service_err.message())
                }
                None => ProviderError::Transport(DisplayErrorContext(&err).to_string()),
            })?;

        output
            .change_info()
            .map(to_change_info)
            .ok_or_else(|| ProviderError::Unknown {
                code: "MissingChangeInfo".to_string(),
                message: format!("no change info returned for zone {}", zone_id),
            })
    }
}
