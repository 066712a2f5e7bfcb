use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The shared development zone.
pub const DEFAULT_HOSTED_ZONE: &str = "Z0400818H9HMCRQLQP0V";
pub const DEFAULT_AWS_PROFILE: &str = "saml";
pub const DEFAULT_TTL: u32 = 60;

const SETTINGS_FILE_NAME: &str = ".cluster-dns.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub records: RecordDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDefaults {
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// Zero disables waiting
    #[serde(default)]
    pub wait_seconds: u64,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            wait_seconds: 0,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosted_zone: None,
            aws_profile: None,
            log_level: default_log_level(),
            records: RecordDefaults::default(),
        }
    }
}

/// Values given on the command line. They win over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hosted_zone: Option<String>,
    pub aws_profile: Option<String>,
    pub ttl: Option<u32>,
    pub wait_seconds: Option<u64>,
}

/// Options shared by the reconciler, purger and enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDnsConfig {
    pub hosted_zone_id: String,
    pub ttl: u32,
    /// Zero disables waiting for changes to propagate
    pub wait: Duration,
}

impl ClusterDnsConfig {
    pub fn new(hosted_zone_id: &str) -> Self {
        Self {
            hosted_zone_id: hosted_zone_id.to_string(),
            ttl: DEFAULT_TTL,
            wait: Duration::ZERO,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when no path
    /// is given. A missing default file yields the built-in defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// `$HOME/.cluster-dns.toml`
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(SETTINGS_FILE_NAME))
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(hosted_zone) = overrides.hosted_zone {
            self.hosted_zone = Some(hosted_zone);
        }
        if let Some(aws_profile) = overrides.aws_profile {
            self.aws_profile = Some(aws_profile);
        }
        if let Some(ttl) = overrides.ttl {
            self.records.ttl = ttl;
        }
        if let Some(wait_seconds) = overrides.wait_seconds {
            self.records.wait_seconds = wait_seconds;
        }
        self
    }

    pub fn hosted_zone(&self) -> &str {
        self.hosted_zone.as_deref().unwrap_or(DEFAULT_HOSTED_ZONE)
    }

    pub fn aws_profile(&self) -> &str {
        self.aws_profile.as_deref().unwrap_or(DEFAULT_AWS_PROFILE)
    }

    pub fn cluster_config(&self) -> ClusterDnsConfig {
        ClusterDnsConfig::new(self.hosted_zone())
            .with_ttl(self.records.ttl)
            .with_wait(Duration::from_secs(self.records.wait_seconds))
    }
}
