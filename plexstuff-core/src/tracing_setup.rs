//! Logging for the plexstuff binary: a quiet console plus a full trace of
//! the last run on disk.

use std::fs::{File, create_dir_all};
use std::path::Path;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Log file rewritten on every run.
pub const LAST_RUN_LOG: &str = "plexstuff-last-run.log";

/// Directory used when no `--logs-dir` is given.
const DEFAULT_LOGS_DIR: &str = "logs";

/// Install the global subscriber for a plexstuff command.
///
/// Search progress and failures go to stderr at `console_level` (or
/// `RUST_LOG` when set), keeping stdout for results and `--json`. Every
/// event, including per-item drop reasons, goes to `LAST_RUN_LOG` inside
/// `logs_dir` (default `./logs`).
///
/// # Errors
/// - The logs directory cannot be created or the log file cannot be opened
/// - A global subscriber is already installed
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let logs_path = logs_dir.unwrap_or_else(|| Path::new(DEFAULT_LOGS_DIR));
    create_dir_all(logs_path)?;

    let log_file_path = logs_path.join(LAST_RUN_LOG);
    let log_file = File::create(&log_file_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(
        console = %console_level,
        log_file = %log_file_path.display(),
        "Logging ready"
    );

    Ok(())
}

/// Value of `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Failed searches only
    Error,
    /// Also rejected indexer responses and bad stored credentials
    Warn,
    /// Also one line per search and its result count
    Info,
    /// Also feed sizes and dropped items
    Debug,
    /// Every HTTP request
    Trace,
}

impl CliLogLevel {
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}
