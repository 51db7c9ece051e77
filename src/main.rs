use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arti_repo::config::AppConfig;
use arti_repo::converter::LegacyRepositoryConverter;
use arti_repo::scanner::{InvalidContentConsumer, InvalidContentLogger, KnownContentConsumer, LoggingContentConsumer, RepositoryScanner, ScanMode};

#[derive(Parser)]
#[command(name = "arti-repo")]
#[command(about = "Scan and convert Maven artifact repositories", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a configured repository and report what it contains
    Scan {
        /// Id of the repository in the configuration
        #[arg(long, short = 'r')]
        repository: String,

        /// Path to the configuration file
        #[arg(long, short = 'c', default_value = "arti-repo.json")]
        config: PathBuf,

        /// Only visit files modified after this point in time (seconds since the epoch)
        #[arg(long)]
        since: Option<u64>,
    },

    /// Copy a legacy layout repository into a default layout repository
    Convert {
        legacy: PathBuf,
        destination: PathBuf,

        /// Glob of legacy paths to leave out, may be repeated
        #[arg(long)]
        exclude: Vec<String>,

        /// Path to the configuration file
        #[arg(long, short = 'c', default_value = "arti-repo.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cancellation = cancel_on_ctrl_c();

    match cli.command {
        Commands::Scan { repository, config, since } => {
            run_scan(&repository, &config, since, cancellation).await
        }
        Commands::Convert { legacy, destination, exclude, config } => {
            run_convert(legacy, destination, exclude, &config, cancellation).await
        }
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping");
            child.cancel();
        }
    });
    token
}

async fn run_scan(repository_id: &str, config_path: &Path, since: Option<u64>, cancellation: CancellationToken) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let repository = config.managed_repository(repository_id)?;

    let mode = match since {
        Some(secs) => ScanMode::Incremental { since: SystemTime::UNIX_EPOCH + Duration::from_secs(secs) },
        None => ScanMode::Fresh,
    };

    let mut artifacts = LoggingContentConsumer::new(vec!["**".to_string()]);
    let mut invalid = InvalidContentLogger::new();

    let summary = RepositoryScanner::with_cancellation(cancellation)
        .scan(
            &repository,
            &mut [&mut artifacts as &mut dyn KnownContentConsumer],
            &mut [&mut invalid as &mut dyn InvalidContentConsumer],
            &config.scan_exclusions,
            mode,
        )
        .await
        .with_context(|| format!("scan of repository {} failed", repository_id))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_convert(legacy: PathBuf, destination: PathBuf, exclude: Vec<String>, config_path: &Path, cancellation: CancellationToken) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let converter = LegacyRepositoryConverter::new(config.file_types()?.into(), config.artifact_mappings())
        .with_scanner(RepositoryScanner::with_cancellation(cancellation));

    let report = converter.convert(&legacy, &destination, &exclude).await?;
    info!("{} artifact(s) converted", report.converted);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
