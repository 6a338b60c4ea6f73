use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::NetworkSource;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reconcile OSM and GIP cycling networks and compare them"
)]
struct Cli {
    /// TOML run configuration
    #[arg(long, short)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the GIP edge-node model
    Reconcile,
    /// Compare OSM and GIP lengths per class and grid cell
    Compare,
    /// Dangling nodes, components and near-miss components of a network
    Topology {
        #[arg(long, value_enum, default_value_t = NetworkSource::Gip)]
        source: NetworkSource,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    tracing::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Reconcile => commands::reconcile(&config),
        Command::Compare => commands::compare(&config),
        Command::Topology { source } => commands::topology(&config, source),
    }
}
