mod commands;
mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use evtrack_core::config::EvTrackConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "evtrack")]
#[command(about = "Track upcoming events and keep a calendar in step with them")]
struct Cli {
    /// Config file (defaults to ~/.config/evtrack/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a snapshot of events against the calendar
    Sync {
        /// JSON file with the collected events
        #[arg(short, long)]
        events: PathBuf,

        /// Track events without creating or deleting calendar entries
        #[arg(long)]
        no_sync: bool,

        /// State file (overrides state_path from config)
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Show what a sync would create and delete, without doing it
    Status {
        #[arg(short, long)]
        events: PathBuf,

        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Print the fingerprint of every event in a snapshot
    Fingerprint {
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Stop tracking one fingerprint (its calendar entry is left alone)
    Forget {
        fingerprint: String,

        #[arg(long)]
        state: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync {
            events,
            no_sync,
            state,
        } => commands::sync::run(&cfg, &events, state, no_sync).await,
        Commands::Status { events, state } => commands::status::run(&cfg, &events, state),
        Commands::Fingerprint { events } => commands::fingerprint::run(&cfg, &events),
        Commands::Forget { fingerprint, state } => {
            commands::forget::run(&cfg, &fingerprint, state)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<EvTrackConfig> {
    let cfg = match path {
        Some(path) => EvTrackConfig::load_from(path)?,
        None => EvTrackConfig::load()?,
    };
    Ok(cfg)
}
