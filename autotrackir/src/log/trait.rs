//! Logger trait definition.

use std::fmt::Arguments;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
}

/// Logging interface for control loop components.
///
/// Implementations must be `Send + Sync`: the logger is shared between the
/// poll task and whoever constructed it.
///
/// ```
/// use autotrackir::log::{Logger, NoOpLogger};
/// use autotrackir::{log_debug, log_warn};
/// use std::sync::Arc;
///
/// let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
/// log_debug!(logger, "Requesting {}", "CAMERA STATE");
/// log_warn!(logger, "SimConnect exception {}", 7);
/// ```
pub trait Logger: Send + Sync {
    /// Log a message at the specified level.
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    /// Log a trace-level message.
    fn trace(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    /// Log a debug-level message.
    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    /// Log an info-level message.
    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Log a warning-level message.
    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    /// Log an error-level message.
    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_default_methods_route_to_log() {
        use std::sync::Mutex;

        struct LevelSink(Mutex<Vec<LogLevel>>);

        impl Logger for LevelSink {
            fn log(&self, level: LogLevel, _args: Arguments<'_>) {
                self.0.lock().unwrap().push(level);
            }
        }

        let sink = LevelSink(Mutex::new(Vec::new()));
        sink.trace(format_args!("t"));
        sink.debug(format_args!("d"));
        sink.info(format_args!("i"));
        sink.warn(format_args!("w"));
        sink.error(format_args!("e"));

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![
                LogLevel::Trace,
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error
            ]
        );
    }

    #[test]
    fn test_macros_route_to_matching_level() {
        use crate::log::RecordingLogger;

        let logger = RecordingLogger::new();
        crate::log_debug!(logger, "id {}", 42);
        crate::log_info!(logger, "Connected to {}", "sim");
        crate::log_warn!(logger, "exception {}", 7);
        crate::log_error!(logger, "decode failed");

        let levels: Vec<LogLevel> = logger.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error
            ]
        );
        assert_eq!(logger.count_containing("Connected to sim"), 1);
    }
}
