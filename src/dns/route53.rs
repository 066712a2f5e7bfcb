use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_route53::config::Region;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types as r53;
use aws_sdk_route53::Client;
use tracing::debug;

use super::provider::{
    AliasTarget, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, PageCursor, RecordSet,
    RecordSetPage, RoutingAttributes, Zone, ZoneDirectory,
};
use crate::error::DirectoryError;

const DEFAULT_REGION: &str = "us-east-1";
const CHANGE_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct Route53Directory {
    client: Client,
    poll_interval: Duration,
}

impl Route53Directory {
    /// Build a client from the shared AWS config, using `profile` for
    /// credentials and region and falling back to us-east-1 when neither the
    /// environment nor the profile sets a region.
    pub async fn from_profile(profile: &str) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .load()
            .await;

        Self::from_client(Client::from_conf(client_config(&shared)))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            poll_interval: CHANGE_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, DirectoryError> {
        let output = self
            .client
            .get_change()
            .id(change_id)
            .send()
            .await
            .map_err(classify)?;

        change_info_from_sdk(output.change_info())
    }

    /// Poll `GetChange` until the change is in sync. `last` holds the most
    /// recently observed status, for callers that give up early.
    async fn poll_until_in_sync(
        &self,
        change_id: &str,
        last: &mut ChangeStatus,
    ) -> Result<ChangeInfo, DirectoryError> {
        loop {
            let info = self.get_change(change_id).await?;
            *last = info.status.clone();
            if info.status == ChangeStatus::InSync {
                return Ok(info);
            }

            debug!(change_id, status = %info.status, "Change not in sync yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn client_config(shared: &SdkConfig) -> aws_sdk_route53::Config {
    let mut config = aws_sdk_route53::config::Builder::from(shared);
    if shared.region().is_none() {
        config = config.region(Region::new(DEFAULT_REGION));
    }
    config.build()
}

#[async_trait]
impl ZoneDirectory for Route53Directory {
    async fn get_zone(&self, zone_id: &str) -> Result<Zone, DirectoryError> {
        let output = self
            .client
            .get_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(classify)?;

        let zone = output.hosted_zone().ok_or_else(|| {
            DirectoryError::InvalidResponse(format!("no hosted zone returned for {}", zone_id))
        })?;

        Ok(Zone {
            id: zone.id().to_string(),
            name: zone.name().to_string(),
        })
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<RecordSetPage, DirectoryError> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .set_start_record_name(cursor.map(|c| c.name.clone()))
            .set_start_record_type(cursor.map(|c| r53::RrType::from(c.record_type.as_str())))
            .set_start_record_identifier(cursor.and_then(|c| c.identifier.clone()))
            .send()
            .await
            .map_err(classify)?;

        let records = output
            .resource_record_sets()
            .iter()
            .map(record_from_sdk)
            .collect();

        let next = if output.is_truncated() {
            let name = output.next_record_name().ok_or_else(|| {
                DirectoryError::InvalidResponse(
                    "truncated listing without a next record name".to_string(),
                )
            })?;

            Some(PageCursor {
                name: name.to_string(),
                record_type: output
                    .next_record_type()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_default(),
                identifier: output.next_record_identifier().map(str::to_string),
            })
        } else {
            None
        };

        Ok(RecordSetPage { records, next })
    }

    async fn submit_change_batch(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, DirectoryError> {
        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(change_batch_to_sdk(batch)?)
            .send()
            .await
            .map_err(classify)?;

        change_info_from_sdk(output.change_info())
    }

    async fn wait_for_change(
        &self,
        change_id: &str,
        timeout: Duration,
    ) -> Result<ChangeInfo, DirectoryError> {
        let change_id = change_id.trim_start_matches("/change/");
        let mut last = ChangeStatus::Pending;
        let outcome =
            tokio::time::timeout(timeout, self.poll_until_in_sync(change_id, &mut last)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::Timeout {
                change_id: change_id.to_string(),
                status: last,
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}

fn record_from_sdk(rrs: &r53::ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: rrs.name().to_string(),
        record_type: rrs.r#type().as_str().to_string(),
        ttl: rrs.ttl().and_then(|ttl| u32::try_from(ttl).ok()),
        values: rrs
            .resource_records()
            .iter()
            .map(|rr| rr.value().to_string())
            .collect(),
        routing: RoutingAttributes {
            set_identifier: rrs.set_identifier().map(str::to_string),
            weight: rrs.weight(),
            region: rrs.region().map(|r| r.as_str().to_string()),
            failover: rrs.failover().map(|f| f.as_str().to_string()),
            multi_value_answer: rrs.multi_value_answer(),
            health_check_id: rrs.health_check_id().map(str::to_string),
            alias_target: rrs.alias_target().map(|alias| AliasTarget {
                hosted_zone_id: alias.hosted_zone_id().to_string(),
                dns_name: alias.dns_name().to_string(),
                evaluate_target_health: alias.evaluate_target_health(),
            }),
        },
    }
}

fn record_to_sdk(record: &RecordSet) -> Result<r53::ResourceRecordSet, DirectoryError> {
    let resource_records = record
        .values
        .iter()
        .map(|value| r53::ResourceRecord::builder().value(value).build())
        .collect::<Result<Vec<_>, _>>()
        .map_err(build_error)?;

    let alias_target = record
        .routing
        .alias_target
        .as_ref()
        .map(|alias| {
            r53::AliasTarget::builder()
                .hosted_zone_id(&alias.hosted_zone_id)
                .dns_name(&alias.dns_name)
                .evaluate_target_health(alias.evaluate_target_health)
                .build()
        })
        .transpose()
        .map_err(build_error)?;

    let routing = &record.routing;
    r53::ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(r53::RrType::from(record.record_type.as_str()))
        .set_ttl(record.ttl.map(i64::from))
        .set_resource_records((!resource_records.is_empty()).then_some(resource_records))
        .set_set_identifier(routing.set_identifier.clone())
        .set_weight(routing.weight)
        .set_region(
            routing
                .region
                .as_deref()
                .map(r53::ResourceRecordSetRegion::from),
        )
        .set_failover(
            routing
                .failover
                .as_deref()
                .map(r53::ResourceRecordSetFailover::from),
        )
        .set_multi_value_answer(routing.multi_value_answer)
        .set_health_check_id(routing.health_check_id.clone())
        .set_alias_target(alias_target)
        .build()
        .map_err(build_error)
}

fn change_batch_to_sdk(batch: &ChangeBatch) -> Result<r53::ChangeBatch, DirectoryError> {
    let changes = batch
        .changes
        .iter()
        .map(|change| {
            let action = match change.action {
                ChangeAction::Upsert => r53::ChangeAction::Upsert,
                ChangeAction::Delete => r53::ChangeAction::Delete,
            };

            r53::Change::builder()
                .action(action)
                .resource_record_set(record_to_sdk(&change.record)?)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>, _>>()?;

    r53::ChangeBatch::builder()
        .comment(&batch.comment)
        .set_changes(Some(changes))
        .build()
        .map_err(build_error)
}

fn change_info_from_sdk(info: Option<&r53::ChangeInfo>) -> Result<ChangeInfo, DirectoryError> {
    let info = info
        .ok_or_else(|| DirectoryError::InvalidResponse("no change info returned".to_string()))?;

    let status = match info.status() {
        r53::ChangeStatus::Insync => ChangeStatus::InSync,
        _ => ChangeStatus::Pending,
    };

    Ok(ChangeInfo {
        id: info.id().to_string(),
        status,
    })
}

fn build_error(err: BuildError) -> DirectoryError {
    DirectoryError::Provider(format!("Failed to build Route 53 request: {}", err))
}

/// Map an SDK failure onto the directory error taxonomy.
fn classify<E, R>(err: SdkError<E, R>) -> DirectoryError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    if matches!(
        err,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    ) {
        return DirectoryError::Transport(message);
    }

    match err.code() {
        Some("NoSuchHostedZone" | "NoSuchChange") => DirectoryError::NotFound(message),
        Some("InvalidChangeBatch" | "PriorRequestNotComplete" | "ConcurrentModification") => {
            DirectoryError::Conflict(message)
        }
        Some("Throttling" | "ThrottlingException") => DirectoryError::RateLimited(message),
        Some(
            "AccessDenied"
            | "AccessDeniedException"
            | "InvalidClientTokenId"
            | "ExpiredToken"
            | "SignatureDoesNotMatch"
            | "UnrecognizedClientException",
        ) => DirectoryError::Auth(message),
        _ => DirectoryError::Provider(message),
    }
}
