//! Manage DNS records for OpenShift clusters in an existing Route 53 hosted zone.

pub mod cluster;
pub mod config;
pub mod dns;
pub mod error;
