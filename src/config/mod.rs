mod install_config;
mod settings;

pub use install_config::{InstallConfig, InstallConfigError, SUPPORTED_BASE_DOMAIN};
pub use settings::{
    ClusterDnsConfig, Overrides, RecordDefaults, Settings, DEFAULT_AWS_PROFILE,
    DEFAULT_HOSTED_ZONE, DEFAULT_TTL,
};
