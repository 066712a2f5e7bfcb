use std::sync::Arc;

use futures::{future, TryStreamExt};
use tracing::{debug, info};

use super::naming::{decode_name, is_owned_by, validate_cluster_name};
use crate::config::ClusterDnsConfig;
use crate::dns::{pagination, ChangeAction, ChangeBatch, ChangeInfo, RecordSet, ZoneDirectory};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// The zone holds no records for the cluster; nothing was submitted
    NothingToDelete,
    Deleted {
        change: ChangeInfo,
        names: Vec<String>,
    },
}

/// Removes every record a cluster owns.
pub struct Purger {
    directory: Arc<dyn ZoneDirectory>,
    config: ClusterDnsConfig,
}

impl Purger {
    pub fn new(directory: Arc<dyn ZoneDirectory>, config: &ClusterDnsConfig) -> Self {
        Self {
            directory,
            config: config.clone(),
        }
    }

    /// All records in the zone owned by `cluster`.
    ///
    /// The listing is drained completely before returning; deleting while
    /// paging would invalidate the cursors.
    pub async fn owned_records(&self, cluster: &str) -> Result<Vec<RecordSet>> {
        let owned: Vec<RecordSet> =
            pagination::record_sets(self.directory.as_ref(), &self.config.hosted_zone_id)
                .try_filter(|record| future::ready(is_owned_by(&record.name, cluster)))
                .try_collect()
                .await?;

        debug!(cluster, count = owned.len(), "Collected cluster records");
        Ok(owned)
    }

    pub async fn purge(&self, cluster: &str) -> Result<PurgeOutcome> {
        validate_cluster_name(cluster)?;

        let owned = self.owned_records(cluster).await?;
        if owned.is_empty() {
            info!("No records found");
            return Ok(PurgeOutcome::NothingToDelete);
        }

        let names: Vec<String> = owned
            .iter()
            .map(|record| decode_name(&record.name).into_owned())
            .collect();

        // Deletes must repeat the stored record exactly, so send what we fetched
        let mut batch = ChangeBatch::new(format!("Delete records for cluster {}", cluster));
        for record in owned {
            batch.push(ChangeAction::Delete, record);
        }

        let change = self
            .directory
            .submit_change_batch(&self.config.hosted_zone_id, &batch)
            .await?;
        info!("Deleted: {}", names.join(" "));

        Ok(PurgeOutcome::Deleted { change, names })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::cluster::{ClusterRecordRequest, Reconciler};
    use crate::dns::memory::{MemoryDirectory, ZONE_ID};
    use crate::error::{DirectoryError, Error};

    fn seeded(page_size: usize) -> Arc<MemoryDirectory> {
        let directory = MemoryDirectory::new("example.com.").with_page_size(page_size);
        directory.insert(RecordSet::a("api.foo.example.com.", Ipv4Addr::new(10, 0, 0, 1), 60));
        directory.insert(RecordSet::a("*.apps.foo.example.com.", Ipv4Addr::new(10, 0, 0, 2), 60));
        directory.insert(RecordSet::a("api.foobar.example.com.", Ipv4Addr::new(10, 0, 1, 1), 60));
        directory.insert(RecordSet::a("www.example.com.", Ipv4Addr::new(10, 0, 2, 1), 300));
        Arc::new(directory)
    }

    fn purger(directory: &Arc<MemoryDirectory>) -> Purger {
        Purger::new(directory.clone(), &ClusterDnsConfig::new(ZONE_ID))
    }

    #[tokio::test]
    async fn test_owned_records_respects_label_boundary() {
        let directory = seeded(100);
        let owned = purger(&directory).owned_records("foo").await.unwrap();

        let names: Vec<&str> = owned.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![r"\052.apps.foo.example.com.", "api.foo.example.com."]);
    }

    #[tokio::test]
    async fn test_purge_deletes_only_cluster_records() {
        let directory = seeded(100);
        let outcome = purger(&directory).purge("foo").await.unwrap();

        match outcome {
            PurgeOutcome::Deleted { names, .. } => {
                assert_eq!(names, vec!["*.apps.foo.example.com.", "api.foo.example.com."]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let remaining: Vec<String> = directory.records().into_iter().map(|r| r.name).collect();
        assert_eq!(remaining, vec!["api.foobar.example.com.", "www.example.com."]);

        let batches = directory.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].comment, "Delete records for cluster foo");
        assert!(batches[0]
            .changes
            .iter()
            .all(|change| change.action == ChangeAction::Delete));
    }

    #[tokio::test]
    async fn test_purge_collects_across_pages() {
        let directory = seeded(1);
        purger(&directory).purge("foo").await.unwrap();

        assert_eq!(directory.list_calls(), 4);
        assert_eq!(directory.submit_calls(), 1);
        assert_eq!(directory.records().len(), 2);
    }

    #[tokio::test]
    async fn test_purge_without_matches_submits_nothing() {
        let directory = seeded(100);
        let outcome = purger(&directory).purge("other").await.unwrap();

        assert_eq!(outcome, PurgeOutcome::NothingToDelete);
        assert_eq!(directory.submit_calls(), 0);
        assert_eq!(directory.records().len(), 4);
    }

    #[tokio::test]
    async fn test_purge_sends_full_record() {
        let directory = MemoryDirectory::new("example.com.");
        let mut record = RecordSet::a("api.foo.example.com.", Ipv4Addr::new(10, 0, 0, 1), 60);
        record.values.push("10.0.0.3".to_string());
        record.routing.set_identifier = Some("east".to_string());
        record.routing.weight = Some(10);
        directory.insert(record.clone());
        let directory = Arc::new(directory);

        purger(&directory).purge("foo").await.unwrap();

        assert!(directory.records().is_empty());
        assert_eq!(directory.batches()[0].changes[0].record, record);
    }

    #[tokio::test]
    async fn test_purge_rejected_batch_keeps_records() {
        let directory = MemoryDirectory::new("example.com.").rejecting_changes();
        directory.insert(RecordSet::a("api.foo.example.com.", Ipv4Addr::new(10, 0, 0, 1), 60));
        let directory = Arc::new(directory);

        let err = purger(&directory).purge("foo").await.unwrap_err();

        assert!(matches!(err, Error::Directory(DirectoryError::Conflict(_))));
        assert_eq!(directory.records().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_removes_records_created_with_upper_case_name() {
        let directory = Arc::new(MemoryDirectory::new("example.com."));
        let config = ClusterDnsConfig::new(ZONE_ID);
        let request = ClusterRecordRequest::new("Foo")
            .with_api(Ipv4Addr::new(10, 0, 0, 1))
            .with_ingress(Ipv4Addr::new(10, 0, 0, 2));
        Reconciler::new(directory.clone(), &config)
            .reconcile(&request)
            .await
            .unwrap();

        let outcome = Purger::new(directory.clone(), &config)
            .purge("Foo")
            .await
            .unwrap();

        assert!(matches!(outcome, PurgeOutcome::Deleted { .. }));
        assert!(directory.records().is_empty());
    }

    #[tokio::test]
    async fn test_purge_skips_escaped_dot_in_cluster_label() {
        let directory = MemoryDirectory::new("example.com.");
        directory.insert(RecordSet::a(
            r"api.foo\056bar.example.com.",
            Ipv4Addr::new(10, 0, 0, 1),
            60,
        ));
        let directory = Arc::new(directory);

        let outcome = purger(&directory).purge("foo").await.unwrap();

        assert_eq!(outcome, PurgeOutcome::NothingToDelete);
        assert_eq!(directory.records().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_rejects_dotted_cluster_name() {
        let directory = seeded(100);
        let err = purger(&directory).purge("foo.example").await.unwrap_err();

        assert!(matches!(err, Error::InvalidClusterName { .. }));
        assert_eq!(directory.list_calls(), 0);
    }
}
