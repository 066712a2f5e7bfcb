//! In-memory zone directory used by the unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::{
    ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, PageCursor, RecordSet, RecordSetPage,
    Zone, ZoneDirectory,
};
use crate::error::DirectoryError;

pub const ZONE_ID: &str = "Z1";

type RecordKey = (String, String, Option<String>);

#[derive(Debug, Default)]
struct Calls {
    list: usize,
    submit: usize,
    wait: usize,
}

/// Stores names the way Route 53 reports them (lower case, wildcard as
/// `\052`), pages its listings and only deletes records that match the
/// stored data exactly.
pub struct MemoryDirectory {
    base_domain: String,
    page_size: usize,
    records: Mutex<BTreeMap<RecordKey, RecordSet>>,
    batches: Mutex<Vec<ChangeBatch>>,
    calls: Mutex<Calls>,
    reject_changes: bool,
    wait_times_out: bool,
}

impl MemoryDirectory {
    pub fn new(base_domain: &str) -> Self {
        Self {
            base_domain: base_domain.to_string(),
            page_size: 100,
            records: Mutex::new(BTreeMap::new()),
            batches: Mutex::new(Vec::new()),
            calls: Mutex::new(Calls::default()),
            reject_changes: false,
            wait_times_out: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn rejecting_changes(mut self) -> Self {
        self.reject_changes = true;
        self
    }

    pub fn with_wait_timeout(mut self) -> Self {
        self.wait_times_out = true;
        self
    }

    pub fn insert(&self, record: RecordSet) {
        let record = stored(record);
        self.records.lock().unwrap().insert(key(&record), record);
    }

    pub fn records(&self) -> Vec<RecordSet> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    pub fn batches(&self) -> Vec<ChangeBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls.lock().unwrap().list
    }

    pub fn submit_calls(&self) -> usize {
        self.calls.lock().unwrap().submit
    }

    pub fn wait_calls(&self) -> usize {
        self.calls.lock().unwrap().wait
    }
}

fn stored(mut record: RecordSet) -> RecordSet {
    record.name.make_ascii_lowercase();
    if let Some(rest) = record.name.strip_prefix('*') {
        record.name = format!("\\052{}", rest);
    }
    record
}

fn key(record: &RecordSet) -> RecordKey {
    (
        record.name.clone(),
        record.record_type.clone(),
        record.routing.set_identifier.clone(),
    )
}

#[async_trait]
impl ZoneDirectory for MemoryDirectory {
    async fn get_zone(&self, zone_id: &str) -> Result<Zone, DirectoryError> {
        if zone_id != ZONE_ID {
            return Err(DirectoryError::NotFound(format!(
                "No hosted zone found with ID: {}",
                zone_id
            )));
        }

        Ok(Zone {
            id: format!("/hostedzone/{}", ZONE_ID),
            name: self.base_domain.clone(),
        })
    }

    async fn list_record_sets(
        &self,
        _zone_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<RecordSetPage, DirectoryError> {
        self.calls.lock().unwrap().list += 1;

        let records = self.records.lock().unwrap();
        let start: Option<RecordKey> =
            cursor.map(|c| (c.name.clone(), c.record_type.clone(), c.identifier.clone()));

        let mut remaining = records
            .iter()
            .filter(|(k, _)| start.as_ref().map_or(true, |s| *k >= s))
            .map(|(_, record)| record.clone());

        let page: Vec<RecordSet> = remaining.by_ref().take(self.page_size).collect();
        let next = remaining.next().map(|record| PageCursor {
            name: record.name,
            record_type: record.record_type,
            identifier: record.routing.set_identifier,
        });

        Ok(RecordSetPage {
            records: page,
            next,
        })
    }

    async fn submit_change_batch(
        &self,
        _zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, DirectoryError> {
        let change_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.submit += 1;
            calls.submit
        };

        if self.reject_changes {
            return Err(DirectoryError::Conflict(
                "PriorRequestNotComplete".to_string(),
            ));
        }

        let mut records = self.records.lock().unwrap();
        let mut updated = records.clone();

        for change in &batch.changes {
            let record = stored(change.record.clone());
            match change.action {
                ChangeAction::Upsert => {
                    updated.insert(key(&record), record);
                }
                ChangeAction::Delete => match updated.get(&key(&record)) {
                    Some(existing) if *existing == record => {
                        updated.remove(&key(&record));
                    }
                    _ => {
                        return Err(DirectoryError::Conflict(format!(
                            "Tried to delete resource record set [name='{}', type='{}'] but the values provided do not match the current values",
                            record.name, record.record_type
                        )));
                    }
                },
            }
        }

        *records = updated;
        self.batches.lock().unwrap().push(batch.clone());

        Ok(ChangeInfo {
            id: format!("/change/C{}", change_number),
            status: ChangeStatus::Pending,
        })
    }

    async fn wait_for_change(
        &self,
        change_id: &str,
        _timeout: Duration,
    ) -> Result<ChangeInfo, DirectoryError> {
        self.calls.lock().unwrap().wait += 1;

        if self.wait_times_out {
            return Err(DirectoryError::Timeout {
                change_id: change_id.to_string(),
                status: ChangeStatus::Pending,
            });
        }

        Ok(ChangeInfo {
            id: change_id.to_string(),
            status: ChangeStatus::InSync,
        })
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
