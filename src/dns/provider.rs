use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DirectoryError;

pub const RECORD_TYPE_A: &str = "A";

/// A hosted zone as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    /// Base domain, usually with a trailing dot
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

/// Routing attributes that identify a record set beyond its name and type.
///
/// None of these are set on records created by this tool, but a delete
/// request has to repeat whatever the directory stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingAttributes {
    pub set_identifier: Option<String>,
    pub weight: Option<i64>,
    pub region: Option<String>,
    pub failover: Option<String>,
    pub multi_value_answer: Option<bool>,
    pub health_check_id: Option<String>,
    pub alias_target: Option<AliasTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub name: String,
    pub record_type: String,
    pub ttl: Option<u32>,
    pub values: Vec<String>,
    pub routing: RoutingAttributes,
}

impl RecordSet {
    /// A single-value A record.
    pub fn a(name: &str, ip: Ipv4Addr, ttl: u32) -> Self {
        Self {
            name: name.to_string(),
            record_type: RECORD_TYPE_A.to_string(),
            ttl: Some(ttl),
            values: vec![ip.to_string()],
            routing: RoutingAttributes::default(),
        }
    }
}

/// Where to resume a truncated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub name: String,
    pub record_type: String,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordSetPage {
    pub records: Vec<RecordSet>,
    /// Set when the listing was truncated
    pub next: Option<PageCursor>,
}

impl RecordSetPage {
    pub fn is_truncated(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Upsert,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Upsert => write!(f, "UPSERT"),
            ChangeAction::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub action: ChangeAction,
    pub record: RecordSet,
}

/// A list of changes the directory applies as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    pub comment: String,
    pub changes: Vec<Change>,
}

impl ChangeBatch {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, action: ChangeAction, record: RecordSet) {
        self.changes.push(Change { action, record });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatus {
    Pending,
    /// The change has been applied on all authoritative servers
    InSync,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Pending => write!(f, "PENDING"),
            ChangeStatus::InSync => write!(f, "INSYNC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: ChangeStatus,
}

/// The hosted DNS service holding the zone.
#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    /// Look up a hosted zone and its base domain
    async fn get_zone(&self, zone_id: &str) -> Result<Zone, DirectoryError>;

    /// Fetch one page of record sets, starting at `cursor` if given
    async fn list_record_sets(
        &self,
        zone_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<RecordSetPage, DirectoryError>;

    /// Submit a change batch; it is applied atomically or not at all
    async fn submit_change_batch(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, DirectoryError>;

    /// Block until the change is in sync or `timeout` elapses
    async fn wait_for_change(
        &self,
        change_id: &str,
        timeout: Duration,
    ) -> Result<ChangeInfo, DirectoryError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
