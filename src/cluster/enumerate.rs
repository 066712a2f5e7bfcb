use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{future, StreamExt, TryStreamExt};

use super::naming::{decode_name, is_cluster_record};
use crate::config::ClusterDnsConfig;
use crate::dns::{pagination, RecordSet, ZoneDirectory};
use crate::error::{Error, Result};

/// A cluster record as shown to the user, with escapes decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRecord {
    pub name: String,
    pub record_type: String,
    pub values: Vec<String>,
}

impl ListedRecord {
    /// Returns `None` for records that are not a cluster API or ingress record.
    pub fn from_record_set(record: RecordSet) -> Option<Self> {
        if !is_cluster_record(&record.name) {
            return None;
        }

        Some(Self {
            name: decode_name(&record.name).into_owned(),
            record_type: record.record_type,
            values: record.values,
        })
    }
}

impl fmt::Display for ListedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name: {}", self.name)?;
        for value in &self.values {
            write!(f, "\n\tvalue: {}", value)?;
        }
        Ok(())
    }
}

/// Lists the API and ingress records of every cluster in the zone.
pub struct Enumerator {
    directory: Arc<dyn ZoneDirectory>,
    config: ClusterDnsConfig,
}

impl Enumerator {
    pub fn new(directory: Arc<dyn ZoneDirectory>, config: &ClusterDnsConfig) -> Self {
        Self {
            directory,
            config: config.clone(),
        }
    }

    /// Stream cluster records; further pages are fetched as the stream is polled.
    pub fn records(&self) -> BoxStream<'_, Result<ListedRecord>> {
        pagination::record_sets(self.directory.as_ref(), &self.config.hosted_zone_id)
            .map_err(Error::from)
            .try_filter_map(|record| future::ready(Ok(ListedRecord::from_record_set(record))))
            .boxed()
    }

    pub async fn collect(&self) -> Result<Vec<ListedRecord>> {
        self.records().try_collect().await
    }
}
