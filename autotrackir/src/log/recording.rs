//! In-memory logger that keeps every line it receives.

use std::fmt::Arguments;
use std::sync::Mutex;

use crate::log::{LogLevel, Logger};

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that records messages instead of emitting them.
///
/// Used by tests to check which lines the control loop produced, e.g. that
/// the "disabled by simulator" notice is throttled or that an empty dispatch
/// queue stays silent. Exported for integration and downstream tests; the
/// production binary logs through [`TracingLogger`](crate::log::TracingLogger).
///
/// ```
/// use autotrackir::log::{LogLevel, Logger, RecordingLogger};
/// use autotrackir::log_warn;
///
/// let logger = RecordingLogger::new();
/// log_warn!(logger, "SimConnect exception {}", 7);
/// assert_eq!(logger.count_at(LogLevel::Warn), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of records whose message contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.records
            .lock()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.message.contains(needle))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of records at exactly `level`.
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.records
            .lock()
            .map(|records| records.iter().filter(|r| r.level == level).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().map(|r| r.is_empty()).unwrap_or(true)
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord {
                level,
                message: args.to_string(),
            });
        }
    }
}
