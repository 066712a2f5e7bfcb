use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use futures::TryStreamExt;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cluster_dns::{
    cluster::{ClusterRecordRequest, Enumerator, Purger, Reconciler},
    config::{InstallConfig, Overrides, Settings, DEFAULT_AWS_PROFILE, DEFAULT_HOSTED_ZONE},
    dns::create_directory,
};

#[derive(Parser)]
#[command(name = "cluster-dns")]
#[command(about = "Manage DNS records for an OpenShift cluster in an existing Route 53 hosted zone")]
#[command(version)]
struct Cli {
    /// Settings file (default is $HOME/.cluster-dns.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ID of the hosted zone where records will be created [default: Z0400818H9HMCRQLQP0V]
    #[arg(long, global = true)]
    hosted_zone: Option<String>,

    /// AWS credentials profile to read from [default: saml]
    #[arg(long, global = true)]
    aws_profile: Option<String>,

    /// Enable debug logging. RUST_LOG, when set, takes precedence
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RecordArgs {
    /// TTL of created records, in seconds [default: 60]
    #[arg(long)]
    ttl: Option<u32>,

    /// Seconds to wait for records to be active. Set to zero to disable waiting
    #[arg(long)]
    wait: Option<u64>,
}

impl From<RecordArgs> for Overrides {
    fn from(args: RecordArgs) -> Self {
        Self {
            ttl: args.ttl,
            wait_seconds: args.wait,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update records for a cluster
    ///
    /// $ cluster-dns create my-cluster --api 1.2.3.4 --ingress 1.2.3.5
    Create {
        /// Cluster name
        cluster: String,

        /// IP address of the api server endpoint
        #[arg(long, required_unless_present = "ingress")]
        api: Option<Ipv4Addr>,

        /// IP address of the ingress endpoint
        #[arg(long, required_unless_present = "api")]
        ingress: Option<Ipv4Addr>,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Create or update records for a cluster from an install-config.yaml
    CreateFromConfig {
        /// Path to install-config.yaml
        path: PathBuf,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Delete records for a cluster
    Delete {
        /// Cluster name
        cluster: String,
    },

    /// List DNS records for all clusters in the hosted zone
    List,

    /// Show configuration file location and contents
    Config,
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref());

    // Initialize logging with config level or default
    let log_level = if cli.verbose {
        "debug"
    } else {
        settings
            .as_ref()
            .map(|s| s.log_level.as_str())
            .unwrap_or("info")
    };
    init_logging(log_level);

    let result = match settings {
        Ok(settings) => run(cli, settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let settings = settings.with_overrides(Overrides {
        hosted_zone: cli.hosted_zone,
        aws_profile: cli.aws_profile,
        ..Default::default()
    });
    debug!(
        hosted_zone = settings.hosted_zone(),
        aws_profile = settings.aws_profile(),
        "Resolved settings"
    );

    match cli.command {
        Commands::Create {
            cluster,
            api,
            ingress,
            records,
        } => {
            let settings = settings.with_overrides(records.into());
            let request = ClusterRecordRequest {
                cluster_name: cluster,
                api_ip: api,
                ingress_ip: ingress,
            };

            let directory = create_directory(settings.aws_profile()).await;
            Reconciler::new(directory, &settings.cluster_config())
                .reconcile(&request)
                .await?;
        }

        Commands::CreateFromConfig { path, records } => {
            let settings = settings.with_overrides(records.into());

            // Everything is validated before talking to the provider
            let install_config = InstallConfig::load(&path)?;
            let request = install_config.cluster_request(settings.hosted_zone())?;

            let directory = create_directory(settings.aws_profile()).await;
            Reconciler::new(directory, &settings.cluster_config())
                .reconcile(&request)
                .await?;
        }

        Commands::Delete { cluster } => {
            let directory = create_directory(settings.aws_profile()).await;
            Purger::new(directory, &settings.cluster_config())
                .purge(&cluster)
                .await?;
        }

        Commands::List => {
            let directory = create_directory(settings.aws_profile()).await;
            let enumerator = Enumerator::new(directory, &settings.cluster_config());

            let mut records = enumerator.records();
            while let Some(record) = records.try_next().await? {
                println!("{}", record);
            }
        }

        Commands::Config => {
            show_config(cli.config.as_deref(), &settings)?;
        }
    }

    Ok(())
}

fn show_config(path: Option<&Path>, settings: &Settings) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).or_else(Settings::config_path);

    match &config_path {
        Some(path) => println!("Configuration file location: {}\n", path.display()),
        None => println!("Configuration file location: unknown, $HOME is not set\n"),
    }

    if config_path.as_deref().is_some_and(Path::exists) {
        println!("Effective configuration:\n");
        println!("{}", toml::to_string_pretty(settings)?);
    } else {
        println!("Configuration file not found. Built-in defaults are in use.");
        println!("\nExample configuration:\n");
        println!(
            r#"hosted_zone = "{}"
aws_profile = "{}"
log_level = "info"

[records]
ttl = 60
wait_seconds = 0
"#,
            DEFAULT_HOSTED_ZONE, DEFAULT_AWS_PROFILE
        );
    }

    println!("Hosted zone: {}", settings.hosted_zone());
    println!("AWS profile: {}", settings.aws_profile());

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_help_mentions_rust_log() {
        let command = Cli::command();
        let verbose = command
            .get_arguments()
            .find(|arg| arg.get_id() == "verbose")
            .unwrap();

        let help = verbose.get_help().unwrap().to_string();
        assert!(help.contains("RUST_LOG"), "help was {:?}", help);
    }
}
