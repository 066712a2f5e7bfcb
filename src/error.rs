//! Error types for cluster-dns.

use thiserror::Error;

use crate::config::InstallConfigError;
use crate::dns::ChangeStatus;

/// Errors returned by the cluster record operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Cluster name is not a single DNS label
    #[error("Invalid cluster name '{name}': {reason}")]
    InvalidClusterName { name: String, reason: &'static str },

    /// Neither an API nor an ingress address was given
    #[error("At least one of the api or ingress addresses must be set")]
    NoAddresses,

    /// install-config.yaml failed validation
    #[error(transparent)]
    InstallConfig(#[from] InstallConfigError),

    /// The zone directory rejected or failed a request
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The change was accepted but not confirmed before the wait expired
    #[error("Change {change_id} was accepted but not confirmed in time (last status: {status})")]
    WaitTimeout {
        change_id: String,
        status: ChangeStatus,
    },
}

/// Errors reported by a [`crate::dns::ZoneDirectory`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflicting change: {0}")]
    Conflict(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Waiting for a change ran out of time
    #[error("Timed out waiting for change {change_id} (last status: {status})")]
    Timeout {
        change_id: String,
        status: ChangeStatus,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider answered with something we could not interpret
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
