//! Logging abstraction used by the control loop.
//!
//! The dispatch decoder and the reaction policy log through a [`Logger`]
//! trait object instead of calling `tracing` directly. Production code plugs
//! in [`TracingLogger`]; tests plug in [`RecordingLogger`] and assert on the
//! exact lines that were (or were not) emitted.
//!
//! [`RecordingLogger`] is public so integration tests and downstream crates
//! can assert on control loop output too. The binary never constructs it.
//!
//! ```
//! use autotrackir::log::{Logger, NoOpLogger};
//! use autotrackir::log_info;
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_info!(logger, "Connected to {}", "simulator");
//! ```

mod noop;
mod recording;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use recording::{LogRecord, RecordingLogger};
pub use tracing_adapter::TracingLogger;
