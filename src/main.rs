//! route53-sync - keep Route 53 A records pointed at this machine.

use clap::{Parser, Subcommand};
use route53_sync::config::Config;
use route53_sync::detector::IpResolver;
use route53_sync::hostnames;
use route53_sync::providers::Route53Provider;
use route53_sync::sync::{Planner, Syncer};
use route53_sync::updater::BatchBuilder;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "route53-sync")]
#[command(about = "Dynamic DNS updater for Amazon Route 53")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to hostnames file (overrides config)
    #[arg(long, global = true)]
    hostnames: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update DNS records to the current public IP
    Sync {
        /// Print the change batches as JSON without submitting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show current public IP and configured zones
    Status,

    /// Validate the hostnames file
    Validate,

    /// Write an example config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "route53_sync=debug,info"
    } else {
        "route53_sync=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    let candidates = [
        dirs::config_dir().map(|p| p.join("route53-sync/config.toml")),
        Some(PathBuf::from("/etc/route53-sync/config.toml")),
        Some(PathBuf::from("route53-sync.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            return candidate;
        }
    }

    Config::default_path().unwrap_or_else(|_| PathBuf::from("route53-sync.toml"))
}

impl Commands {
    fn label(&self) -> &'static str {
        match self {
            Commands::Sync { .. } => "Sync",
            Commands::Status => "Status",
            Commands::Validate => "Validation",
            Commands::Init { .. } => "Init",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config_path = get_config_path(cli.config);
    let command = cli.command.unwrap_or(Commands::Sync { dry_run: false });
    let label = command.label();

    if let Err(e) = run(command, &config_path, cli.hostnames).await {
        tracing::error!("{} failed: {:#}", label, e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(command: Commands, config_path: &Path, hostnames: Option<PathBuf>) -> anyhow::Result<()> {
    match command {
        Commands::Sync { dry_run } => {
            let config = load_config(config_path, hostnames)?;
            if dry_run {
                cmd_plan(config).await
            } else {
                cmd_sync(config).await
            }
        }
        Commands::Status => cmd_status(load_config(config_path, hostnames)?).await,
        Commands::Validate => cmd_validate(load_config(config_path, hostnames)?),
        Commands::Init { force } => cmd_init(config_path, force),
    }
}

fn load_config(path: &Path, hostnames: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = Config::load_from(path)?;
    if let Some(hostnames) = hostnames {
        config.hostnames_path = hostnames;
    }
    Ok(config)
}

async fn cmd_sync(config: Config) -> anyhow::Result<()> {
    let provider = Route53Provider::from_env(config.region.clone()).await;
    let syncer = Syncer::from_config(&config, provider)?;
    let report = syncer.run().await?;

    let failed = report.failed_zones().count();
    if failed > 0 {
        tracing::warn!(
            "{} of {} zone(s) failed to update to {}",
            failed,
            report.zones.len(),
            report.ip
        );
    } else {
        tracing::info!("{} zone(s) updated to {}", report.zones.len(), report.ip);
    }

    Ok(())
}

async fn cmd_plan(config: Config) -> anyhow::Result<()> {
    let planner = Planner::from_config(&config)?;
    let plan = planner.plan(&BatchBuilder::from_config(&config)).await?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

async fn cmd_status(config: Config) -> anyhow::Result<()> {
    let resolver = IpResolver::from_config(&config)?;

    println!("route53-sync Status");
    println!("===================\n");

    match resolver.resolve().await {
        Ok(ip) => println!("Current Public IP: {}", ip),
        Err(e) => println!("Failed to detect IP from {}: {}", resolver.url(), e),
    }

    println!("\nZones ({}):", config.hostnames_path.display());
    println!("------");

    match hostnames::load(&config.hostnames_path) {
        Ok(entries) => {
            for (zone_id, names) in hostnames::group(&entries) {
                println!("  {}: {}", zone_id, names.join(", "));
            }
        }
        Err(e) => println!("  error: {}", e),
    }

    Ok(())
}

fn cmd_validate(config: Config) -> anyhow::Result<()> {
    let entries = hostnames::load(&config.hostnames_path)?;
    let zones = hostnames::group(&entries);

    println!(
        "{}: {} hostname(s) in {} zone(s)",
        config.hostnames_path.display(),
        entries.len(),
        zones.len()
    );

    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::example().save_to(path)?;
    println!("Wrote example config to {}", path.display());
    Ok(())
}
