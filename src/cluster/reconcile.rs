use std::sync::Arc;

use tracing::info;

use super::naming::{api_record_name, ingress_record_name, validate_cluster_name};
use super::ClusterRecordRequest;
use crate::config::ClusterDnsConfig;
use crate::dns::{ChangeAction, ChangeBatch, ChangeInfo, RecordSet, ZoneDirectory};
use crate::error::{DirectoryError, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Latest known state of the submitted change
    pub change: ChangeInfo,
    pub records: Vec<String>,
}

/// Creates or updates a cluster's API and ingress records.
pub struct Reconciler {
    directory: Arc<dyn ZoneDirectory>,
    config: ClusterDnsConfig,
}

/// Build the upsert batch for `request` in a zone whose base domain is
/// `base_domain`. The API record comes first.
pub fn desired_batch(request: &ClusterRecordRequest, base_domain: &str, ttl: u32) -> ChangeBatch {
    let cluster = &request.cluster_name;
    let mut batch = ChangeBatch::new(format!(
        "Create or update records for cluster {}",
        cluster
    ));

    if let Some(ip) = request.api_ip {
        batch.push(
            ChangeAction::Upsert,
            RecordSet::a(&api_record_name(cluster, base_domain), ip, ttl),
        );
    }

    if let Some(ip) = request.ingress_ip {
        batch.push(
            ChangeAction::Upsert,
            RecordSet::a(&ingress_record_name(cluster, base_domain), ip, ttl),
        );
    }

    batch
}

impl Reconciler {
    pub fn new(directory: Arc<dyn ZoneDirectory>, config: &ClusterDnsConfig) -> Self {
        Self {
            directory,
            config: config.clone(),
        }
    }

    pub async fn reconcile(&self, request: &ClusterRecordRequest) -> Result<ReconcileOutcome> {
        validate_cluster_name(&request.cluster_name)?;
        if request.api_ip.is_none() && request.ingress_ip.is_none() {
            return Err(Error::NoAddresses);
        }

        let zone_id = &self.config.hosted_zone_id;
        let zone = self.directory.get_zone(zone_id).await?;
        info!("Base domain: {}", zone.name);

        let batch = desired_batch(request, &zone.name, self.config.ttl);
        let records: Vec<String> = batch
            .changes
            .iter()
            .map(|change| change.record.name.clone())
            .collect();
        info!("Create or update records: {}", records.join(" "));

        let change = self.directory.submit_change_batch(zone_id, &batch).await?;
        info!("Status: {}", change.status);

        let wait = self.config.wait;
        if wait.is_zero() {
            return Ok(ReconcileOutcome { change, records });
        }

        info!(
            "Waiting up to {} seconds for records to be updated",
            wait.as_secs()
        );

        let change = match self.directory.wait_for_change(&change.id, wait).await {
            Ok(change) => change,
            Err(DirectoryError::Timeout { change_id, status }) => {
                return Err(Error::WaitTimeout { change_id, status });
            }
            Err(e) => return Err(e.into()),
        };
        info!("Status: {}", change.status);

        Ok(ReconcileOutcome { change, records })
    }
}
