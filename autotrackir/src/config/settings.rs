//! Settings structs, one per `[section]` of `config.ini`.

use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub simconnect: SimConnectSettings,
    pub poll: PollSettings,
    pub reaction: ReactionSettings,
    pub logging: LoggingSettings,
}

/// `[simconnect]`
#[derive(Debug, Clone, PartialEq)]
pub struct SimConnectSettings {
    /// Name the client announces to the simulator.
    pub app_name: String,
    /// Delay between connection attempts, in milliseconds.
    pub retry_interval_ms: u64,
    /// Explicit path to `SimConnect.dll`; `None` looks next to the executable.
    pub library_path: Option<PathBuf>,
}

impl SimConnectSettings {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// `[poll]`
#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    /// Time between poll ticks, in milliseconds.
    pub interval_ms: u64,
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// `[reaction]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSettings {
    /// Minimum seconds between two "disabled by simulator" notices.
    pub log_debounce_secs: u64,
}

impl ReactionSettings {
    pub fn log_debounce(&self) -> Duration {
        Duration::from_secs(self.log_debounce_secs)
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
