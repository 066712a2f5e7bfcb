//! Record names owned by a cluster.
//!
//! A cluster `c` in a zone with base domain `d` owns exactly two names:
//! `api.c.d` and `*.apps.c.d`. Route 53 reports the wildcard label as the
//! octal escape `\052` and stores names in lower case. Ownership checks only
//! unescape that leading wildcard; other escapes stay inside their label.

use std::borrow::Cow;

use crate::error::{Error, Result};

pub const API_PREFIX: &str = "api.";
pub const INGRESS_PREFIX: &str = "*.apps.";

/// Check that `name` is a single DNS label.
pub fn validate_cluster_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.len() > 63 {
        Some("must be at most 63 characters")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        Some("may only contain ASCII letters, digits and '-'")
    } else if name.starts_with('-') || name.ends_with('-') {
        Some("must not start or end with '-'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidClusterName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

pub fn api_record_name(cluster: &str, base_domain: &str) -> String {
    format!("{}{}.{}", API_PREFIX, cluster, base_domain)
}

pub fn ingress_record_name(cluster: &str, base_domain: &str) -> String {
    format!("{}{}.{}", INGRESS_PREFIX, cluster, base_domain)
}

/// Decode `\ooo` octal escapes as used by Route 53 (`\052` is `*`).
pub fn decode_name(name: &str) -> Cow<'_, str> {
    if !name.contains('\\') {
        return Cow::Borrowed(name);
    }

    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let digits = &bytes[i + 1..bytes.len().min(i + 4)];
            if digits.len() == 3 && digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    decoded.push(byte);
                    i += 4;
                    continue;
                }
            }
        }

        decoded.push(bytes[i]);
        i += 1;
    }

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

/// Replace a leading `\052` label with `*`, leaving the rest untouched.
fn unescape_wildcard(name: &str) -> Cow<'_, str> {
    match name.strip_prefix(r"\052") {
        Some(rest) => Cow::Owned(format!("*{}", rest)),
        None => Cow::Borrowed(name),
    }
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Whether the record `name` belongs to `cluster`.
///
/// The trailing dot after the cluster name is part of the match: cluster
/// `foo` does not own `api.foobar.example.com.` nor `api.foo\056bar.example.com.`.
/// Case is ignored, as DNS names are.
pub fn is_owned_by(name: &str, cluster: &str) -> bool {
    let name = unescape_wildcard(name);
    let api = format!("{}{}.", API_PREFIX, cluster);
    let ingress = format!("{}{}.", INGRESS_PREFIX, cluster);

    has_prefix_ignore_case(&name, &api) || has_prefix_ignore_case(&name, &ingress)
}

/// Whether the record `name` looks like any cluster's API or ingress record.
pub fn is_cluster_record(name: &str) -> bool {
    let name = unescape_wildcard(name);
    has_prefix_ignore_case(&name, API_PREFIX) || has_prefix_ignore_case(&name, INGRESS_PREFIX)
}
