//! Plexstuff CLI - Command-line interface
//!
//! Provides command-line access to torrent search and service settings.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use plexstuff_core::tracing_setup::{CliLogLevel, init_tracing};
use plexstuff_core::{JsonFileStore, PlexstuffConfig};

#[derive(Parser)]
#[command(name = "plexstuff")]
#[command(about = "Find torrents for books, shows and movies through Jackett")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Service settings file (defaults to ~/.config/plexstuff/services.json)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Directory for the full debug log of this run
    #[arg(long)]
    logs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref()) {
        eprintln!("warning: file logging disabled: {e}");
    }

    let mut config = PlexstuffConfig::from_env();
    if let Some(store) = cli.store {
        config.storage.store_path = store;
    }

    let store = Arc::new(JsonFileStore::open(config.storage.store_path.clone()));
    tracing::debug!(store = %store.path().display(), "Using service store");

    match commands::handle_command(cli.command, &config, store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(commands::report_failure(&e)),
    }
}
