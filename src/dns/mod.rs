#[cfg(test)]
pub(crate) mod memory;
pub mod pagination;
mod provider;
mod route53;

pub use provider::{
    AliasTarget, Change, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, PageCursor,
    RecordSet, RecordSetPage, RoutingAttributes, Zone, ZoneDirectory, RECORD_TYPE_A,
};
pub use route53::Route53Directory;

use std::sync::Arc;

use tracing::debug;

/// Create the zone directory for the given AWS credentials profile.
pub async fn create_directory(aws_profile: &str) -> Arc<dyn ZoneDirectory> {
    let directory = Route53Directory::from_profile(aws_profile).await;
    debug!(
        provider = directory.provider_name(),
        profile = aws_profile,
        "Zone directory ready"
    );
    Arc::new(directory)
}
