// File logging; the TUI owns the terminal, so nothing goes to stderr

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file name inside the log directory
pub const LOG_FILE: &str = "replterm.log";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Route `tracing` events to `<log_dir>/replterm.log`
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Keep the returned
/// guard alive until exit or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::Directory {
        path: log_dir.to_path_buf(),
        source,
    })?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_line_number(true)
        .try_init()
        .map_err(LoggingError::Subscriber)?;

    Ok(guard)
}
