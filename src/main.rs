//! Wikirace main entry point
//!
//! This is the command-line interface for the Wikirace link racer.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wikirace::api::{RaceRequest, RaceResponse};
use wikirace::config::{load_config_with_hash, Config};
use wikirace::provider::WikipediaProvider;
use wikirace::race::Coordinator;

/// Wikirace: find a chain of links between two encyclopedia pages
///
/// Several crawlers expand outward from the start page while one crawler
/// expands backward from the end page; the race ends when the two sides meet.
/// The result is printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "wikirace")]
#[command(version)]
#[command(about = "Race between two encyclopedia pages", long_about = None)]
struct Cli {
    /// Title of the page to start from
    #[arg(value_name = "START")]
    start: String,

    /// Title of the page to reach
    #[arg(value_name = "END")]
    end: String,

    /// Race timeout in seconds (1-999)
    #[arg(short, long)]
    timeout: Option<String>,

    /// Number of forward workers (1-9)
    #[arg(short, long)]
    workers: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path).map_err(|e| {
                tracing::error!("Failed to load configuration: {}", e);
                e
            })?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let request = RaceRequest {
        start: Some(cli.start.clone()),
        end: Some(cli.end.clone()),
        timeout: cli.timeout.clone(),
        workers: cli.workers.clone(),
    };

    let response = match request.validate(&config.race) {
        Ok(params) => {
            let provider = WikipediaProvider::from_config(&config)?;
            let coordinator = Coordinator::new(provider, config.race.clone());
            let report = coordinator.race(&params).await?;

            tracing::info!(
                "Discovered {} forward / {} backward titles",
                report.forward_discovered,
                report.backward_discovered
            );
            RaceResponse::from_report(&report)
        }
        Err(errors) => RaceResponse::from_errors(&errors),
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wikirace=warn"),
            1 => EnvFilter::new("wikirace=info,warn"),
            2 => EnvFilter::new("wikirace=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
