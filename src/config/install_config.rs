//! OpenShift `install-config.yaml`, reduced to the fields needed for DNS.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::settings::DEFAULT_HOSTED_ZONE;
use crate::cluster::naming::validate_cluster_name;
use crate::cluster::ClusterRecordRequest;

/// The only base domain served by the default hosted zone.
pub const SUPPORTED_BASE_DOMAIN: &str = "shiftstack-dev.devcluster.openshift.com";

#[derive(Debug, Error)]
pub enum InstallConfigError {
    #[error("Failed to read install config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse install config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    // TODO: look up the zone for the install config's baseDomain instead
    #[error("Only the default hosted zone ({expected}) is currently supported, got {actual}")]
    UnsupportedZone {
        expected: &'static str,
        actual: String,
    },

    #[error("baseDomain must be set to '{expected}', got '{actual}'")]
    UnsupportedBaseDomain {
        expected: &'static str,
        actual: String,
    },

    #[error("{0} must be set")]
    MissingField(&'static str),

    #[error("{field} is not a valid IPv4 address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallConfig {
    pub base_domain: String,
    pub metadata: Metadata,
    pub platform: Platform,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Platform {
    pub openstack: OpenStack,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenStack {
    #[serde(rename = "apiFloatingIP")]
    pub api_floating_ip: String,
    #[serde(rename = "ingressFloatingIP")]
    pub ingress_floating_ip: String,
}

impl InstallConfig {
    pub fn load(path: &Path) -> Result<Self, InstallConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| InstallConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| InstallConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the config against `hosted_zone_id` and turn it into a
    /// request for both cluster records.
    pub fn cluster_request(&self, hosted_zone_id: &str) -> crate::error::Result<ClusterRecordRequest> {
        if hosted_zone_id != DEFAULT_HOSTED_ZONE {
            return Err(InstallConfigError::UnsupportedZone {
                expected: DEFAULT_HOSTED_ZONE,
                actual: hosted_zone_id.to_string(),
            }
            .into());
        }

        if self.base_domain != SUPPORTED_BASE_DOMAIN {
            return Err(InstallConfigError::UnsupportedBaseDomain {
                expected: SUPPORTED_BASE_DOMAIN,
                actual: self.base_domain.clone(),
            }
            .into());
        }

        if self.metadata.name.is_empty() {
            return Err(InstallConfigError::MissingField("metadata.name").into());
        }
        validate_cluster_name(&self.metadata.name)?;

        let openstack = &self.platform.openstack;
        let api_ip = parse_address("platform.openstack.apiFloatingIP", &openstack.api_floating_ip)?;
        let ingress_ip = parse_address(
            "platform.openstack.ingressFloatingIP",
            &openstack.ingress_floating_ip,
        )?;

        Ok(ClusterRecordRequest::new(&self.metadata.name)
            .with_api(api_ip)
            .with_ingress(ingress_ip))
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Ipv4Addr, InstallConfigError> {
    if value.is_empty() {
        return Err(InstallConfigError::MissingField(field));
    }

    value.parse().map_err(|_| InstallConfigError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}
