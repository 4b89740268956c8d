//! One sync run: resolve IP, load hostnames, group, update each zone.

use crate::config::Config;
use crate::detector::IpResolver;
use crate::error::Result;
use crate::hostnames::{self, ZoneChangeSet};
use crate::providers::{ChangeBatch, ChangeInfo, ProviderError, RecordProvider};
use crate::updater::{BatchBuilder, RecordUpdater};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Outcome of one zone's batch.
#[derive(Debug)]
pub struct ZoneOutcome {
    pub zone_id: String,
    pub hostnames: Vec<String>,
    pub result: std::result::Result<ChangeInfo, ProviderError>,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct SyncReport {
    pub ip: Ipv4Addr,
    pub zones: Vec<ZoneOutcome>,
}

impl SyncReport {
    pub fn failed_zones(&self) -> impl Iterator<Item = &ZoneOutcome> {
        self.zones.iter().filter(|z| z.result.is_err())
    }

    pub fn is_clean(&self) -> bool {
        self.failed_zones().next().is_none()
    }
}

/// The batch a run would submit for one zone.
#[derive(Debug, Serialize)]
pub struct ZoneBatch {
    pub zone_id: String,
    pub batch: ChangeBatch,
}

/// What a run would submit, without submitting it.
#[derive(Debug, Serialize)]
pub struct SyncPlan {
    pub ip: Ipv4Addr,
    pub batches: Vec<ZoneBatch>,
}

/// Resolves the IP and groups the hostnames file. Needs no DNS provider.
pub struct Planner {
    resolver: IpResolver,
    hostnames_path: PathBuf,
}

impl Planner {
    pub fn new(resolver: IpResolver, hostnames_path: PathBuf) -> Self {
        Self {
            resolver,
            hostnames_path,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            IpResolver::from_config(config)?,
            config.hostnames_path.clone(),
        ))
    }

    /// Resolve the IP first, then read the hostnames file.
    pub async fn prepare(&self) -> Result<(Ipv4Addr, ZoneChangeSet)> {
        let ip = self.resolver.resolve().await?;
        tracing::info!("Current public IP: {}", ip);

        let entries = hostnames::load(&self.hostnames_path)?;
        let zones = hostnames::group(&entries);
        tracing::debug!(
            "{} hostname(s) across {} zone(s)",
            entries.len(),
            zones.len()
        );
        Ok((ip, zones))
    }

    /// Resolve and group, returning the batches a run would submit.
    pub async fn plan(&self, builder: &BatchBuilder) -> Result<SyncPlan> {
        let (ip, zones) = self.prepare().await?;
        let batches = zones
            .into_iter()
            .map(|(zone_id, names)| ZoneBatch {
                batch: builder.build(&names, ip),
                zone_id,
            })
            .collect();
        Ok(SyncPlan { ip, batches })
    }
}

/// Sequences a sync run.
pub struct Syncer<P> {
    planner: Planner,
    updater: RecordUpdater<P>,
}

impl<P: RecordProvider> Syncer<P> {
    pub fn new(planner: Planner, updater: RecordUpdater<P>) -> Self {
        Self { planner, updater }
    }

    pub fn from_config(config: &Config, provider: P) -> Result<Self> {
        Ok(Self::new(
            Planner::from_config(config)?,
            RecordUpdater::from_config(provider, config),
        ))
    }

    /// Run the sync. IP and hostnames failures abort; zone failures are recorded.
    pub async fn run(&self) -> Result<SyncReport> {
        let (ip, zones) = self.planner.prepare().await?;

        let mut outcomes = Vec::with_capacity(zones.len());
        for (zone_id, names) in zones {
            let result = self.updater.update(&zone_id, &names, ip).await;
            if let Err(e) = &result {
                tracing::error!(zone = %zone_id, code = e.code(), "Zone update failed: {}", e);
            }
            outcomes.push(ZoneOutcome {
                zone_id,
                hostnames: names,
                result,
            });
        }

        Ok(SyncReport {
            ip,
            zones: outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::providers::MockRecordProvider;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn ip_server(ip: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"IP": ip})))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn hostnames_file(content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostnames.csv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn planner(server: &MockServer, path: PathBuf) -> Planner {
        let resolver = IpResolver::new(server.uri(), Duration::from_secs(1)).unwrap();
        Planner::new(resolver, path)
    }

    fn syncer(
        server: &MockServer,
        path: PathBuf,
        provider: MockRecordProvider,
    ) -> Syncer<MockRecordProvider> {
        Syncer::new(
            planner(server, path),
            RecordUpdater::new(provider, BatchBuilder::new(600, "ddns")),
        )
    }

    fn accepted(id: &str) -> ChangeInfo {
        ChangeInfo {
            id: id.to_string(),
            status: "PENDING".to_string(),
            submitted_at: None,
        }
    }

    fn all_upserts_to(batch: &ChangeBatch, ip: &str) -> bool {
        batch
            .changes
            .iter()
            .all(|c| c.value == ip && c.ttl == 600 && c.record_type == crate::providers::RecordType::A)
    }

    #[tokio::test]
    async fn test_one_batch_per_zone() {
        let server = ip_server("203.0.113.5").await;
        let (_dir, path) =
            hostnames_file("Z1,a.example.com\nZ1,b.example.com\nZ2,c.example.com\n");

        let mut provider = MockRecordProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_change_record_sets()
            .withf(|zone_id, batch| {
                zone_id.to_string() == "Z1"
                    && batch.changes.len() == 2
                    && all_upserts_to(batch, "203.0.113.5")
            })
            .times(1)
            .returning(|_, _| Ok(accepted("C1")));
        provider
            .expect_change_record_sets()
            .withf(|zone_id, batch| {
                zone_id.to_string() == "Z2"
                    && batch.changes.len() == 1
                    && all_upserts_to(batch, "203.0.113.5")
            })
            .times(1)
            .returning(|_, _| Ok(accepted("C2")));

        let report = syncer(&server, path, provider).run().await.unwrap();

        assert_eq!(report.ip, Ipv4Addr::new(203, 0, 113, 5));
        assert_eq!(report.zones.len(), 2);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_ip_failure_aborts_before_reading_hostnames() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.csv");

        let mut provider = MockRecordProvider::new();
        provider.expect_change_record_sets().times(0);

        let err = syncer(&server, missing, provider).run().await.unwrap_err();
        assert!(matches!(err, SyncError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_bad_line_aborts_before_any_update() {
        let server = ip_server("203.0.113.5").await;
        let (_dir, path) = hostnames_file("Z1,a.example.com\nbroken line\n");

        let mut provider = MockRecordProvider::new();
        provider.expect_change_record_sets().times(0);

        let err = syncer(&server, path, provider).run().await.unwrap_err();
        assert!(matches!(err, SyncError::Format { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_zone_failure_does_not_stop_other_zones() {
        let server = ip_server("203.0.113.5").await;
        let (_dir, path) = hostnames_file("Z1,a.example.com\nZ2,c.example.com\n");

        let mut provider = MockRecordProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_change_record_sets()
            .withf(|zone_id, _| zone_id.to_string() == "Z1")
            .times(1)
            .returning(|_, _| {
                Err(ProviderError::NoSuchHostedZone(
                    "No hosted zone found with ID: Z1".to_string(),
                ))
            });
        provider
            .expect_change_record_sets()
            .withf(|zone_id, _| zone_id.to_string() == "Z2")
            .times(1)
            .returning(|_, _| Ok(accepted("C2")));

        let report = syncer(&server, path, provider).run().await.unwrap();

        assert_eq!(report.zones.len(), 2);
        let failed: Vec<_> = report.failed_zones().map(|z| z.zone_id.as_str()).collect();
        assert_eq!(failed, ["Z1"]);

        let z2 = report.zones.iter().find(|z| z.zone_id == "Z2").unwrap();
        assert_eq!(z2.result, Ok(accepted("C2")));
        assert_eq!(z2.hostnames, ["c.example.com"]);
    }

    #[tokio::test]
    async fn test_plan_without_provider() {
        let server = ip_server("198.51.100.7").await;
        let (_dir, path) = hostnames_file("Z1,a.example.com\nZ1,a.example.com\n");

        let plan = planner(&server, path)
            .plan(&BatchBuilder::new(600, "ddns"))
            .await
            .unwrap();

        assert_eq!(plan.ip, Ipv4Addr::new(198, 51, 100, 7));
        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.batches[0].zone_id, "Z1");
        assert_eq!(plan.batches[0].batch.changes.len(), 2);
    }

    #[tokio::test]
    async fn test_plan_json() {
        let server = ip_server("198.51.100.7").await;
        let (_dir, path) = hostnames_file("Z1,a.example.com\n");

        let plan = planner(&server, path)
            .plan(&BatchBuilder::new(300, "ddns"))
            .await
            .unwrap();

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ip": "198.51.100.7",
                "batches": [{
                    "zone_id": "Z1",
                    "batch": {
                        "comment": "ddns",
                        "changes": [{
                            "action": "UPSERT",
                            "name": "a.example.com",
                            "record_type": "A",
                            "ttl": 300,
                            "value": "198.51.100.7"
                        }]
                    }
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_plan_aborts_on_ip_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = planner(&server, dir.path().join("absent.csv"))
            .plan(&BatchBuilder::new(600, "ddns"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Protocol(_)));
    }
}
