mod enumerate;
pub mod naming;
mod purge;
mod reconcile;

pub use enumerate::{Enumerator, ListedRecord};
pub use purge::{PurgeOutcome, Purger};
pub use reconcile::{desired_batch, ReconcileOutcome, Reconciler};

use std::net::Ipv4Addr;

/// Desired addresses for a cluster's endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRecordRequest {
    pub cluster_name: String,
    pub api_ip: Option<Ipv4Addr>,
    pub ingress_ip: Option<Ipv4Addr>,
}

impl ClusterRecordRequest {
    pub fn new(cluster_name: &str) -> Self {
        Self {
            cluster_name: cluster_name.to_string(),
            api_ip: None,
            ingress_ip: None,
        }
    }

    pub fn with_api(mut self, ip: Ipv4Addr) -> Self {
        self.api_ip = Some(ip);
        self
    }

    pub fn with_ingress(mut self, ip: Ipv4Addr) -> Self {
        self.ingress_ip = Some(ip);
        self
    }
}
