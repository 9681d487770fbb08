//! Logging infrastructure for AutoTrackIR.
//!
//! Provides structured logging with file output and console output:
//! - Writes to `~/.autotrackir/autotrackir.log` (cleared on every start)
//! - Also prints to stdout so the console window shows what happened
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Errors setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Log file path has no file name: {0}")]
    InvalidPath(PathBuf),

    #[error("Logging already initialised: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Filter used when RUST_LOG is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "autotrackir=debug,info"
    } else {
        "info"
    }
}

/// Create the log directory and truncate the log file.
///
/// Returns the directory and file name for the appender.
pub fn prepare_log_file(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?
        .to_string();
    let log_dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let to_error = |source| LoggingError::LogFile {
        path: log_path.to_path_buf(),
        source,
    };
    fs::create_dir_all(&log_dir).map_err(to_error)?;
    fs::write(log_path, "").map_err(to_error)?;

    Ok((log_dir, file_name))
}

/// Initialize logging system.
///
/// Clears the previous log file and sets up dual output to both the file
/// and stdout. `debug` lowers the default level for this crate to DEBUG;
/// RUST_LOG overrides it either way.
///
/// The returned guard must be kept alive for logging to work.
pub fn init_logging(log_path: &Path, debug: bool) -> Result<LoggingGuard, LoggingError> {
    let (log_dir, file_name) = prepare_log_file(log_path)?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .compact();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert!(default_filter(true).contains("autotrackir=debug"));
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("deep").join("nested").join("a.log");

        let (dir, name) = prepare_log_file(&log_path).unwrap();

        assert_eq!(dir, temp_dir.path().join("deep").join("nested"));
        assert_eq!(name, "a.log");
        assert!(log_path.exists());
    }

    #[test]
    fn test_prepare_clears_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("autotrackir.log");
        fs::write(&log_path, "old log data").unwrap();

        prepare_log_file(&log_path).unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "");
    }

    #[test]
    fn test_prepare_rejects_path_without_file_name() {
        let result = prepare_log_file(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }

    // Actual log output goes through the global subscriber, which can only
    // be installed once per process; it is left to manual testing.
}
