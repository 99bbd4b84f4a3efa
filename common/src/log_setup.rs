use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Number of daily log files kept in the log directory.
const MAX_LOG_FILES: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to create log directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("Logging already initialized")]
    AlreadyInitialized,

    #[error("Logger initialization failed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs a console layer and a daily-rolling file layer.
///
/// `RUST_LOG` takes precedence over `base_level`. Files are named
/// `<file_prefix>.<date>.log` inside `log_dir`. Warnings and errors also go to
/// stderr.
pub fn setup_logging(base_level: &str, log_dir: &Path, file_prefix: &str) -> Result<(), LogSetupError> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(base_level))?;

    std::fs::create_dir_all(log_dir).map_err(|source| LogSetupError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
