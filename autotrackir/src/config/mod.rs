//! User configuration for AutoTrackIR.
//!
//! The configuration lives in `~/.autotrackir/config.ini`. Every key is
//! optional; a missing file or key falls back to the built-in defaults.
//!
//! ```ini
//! [simconnect]
//! app_name = AutoTrackIr
//! retry_interval_ms = 1000
//! library_path =
//!
//! [poll]
//! interval_ms = 350
//!
//! [reaction]
//! log_debounce_secs = 10
//!
//! [logging]
//! file = ~/.autotrackir/autotrackir.log
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    DEFAULT_APP_NAME, DEFAULT_LOG_DEBOUNCE_SECS, DEFAULT_LOG_FILE_NAME, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RETRY_INTERVAL_MS, MIN_POLL_INTERVAL_MS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, LoggingSettings, PollSettings, ReactionSettings, SimConnectSettings,
};
