//! Default values for every configuration key.

use super::file::config_directory;
use super::settings::*;

/// Name announced to SimConnect.
pub const DEFAULT_APP_NAME: &str = "AutoTrackIr";

/// Delay between connection attempts.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;

/// Poll period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 350;

/// Shortest accepted poll period.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Minimum seconds between "disabled by simulator" notices.
pub const DEFAULT_LOG_DEBOUNCE_SECS: u64 = 10;

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "autotrackir.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            simconnect: SimConnectSettings {
                app_name: DEFAULT_APP_NAME.to_string(),
                retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
                library_path: None,
            },
            poll: PollSettings {
                interval_ms: DEFAULT_POLL_INTERVAL_MS,
            },
            reaction: ReactionSettings {
                log_debounce_secs: DEFAULT_LOG_DEBOUNCE_SECS,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_control_loop_constants() {
        let config = ConfigFile::default();

        assert_eq!(config.poll.interval(), crate::poller::DEFAULT_POLL_INTERVAL);
        assert_eq!(
            config.simconnect.retry_interval(),
            crate::session::DEFAULT_RETRY_INTERVAL
        );
        assert_eq!(
            config.reaction.log_debounce(),
            crate::reaction::DEFAULT_LOG_DEBOUNCE
        );
        assert_eq!(config.simconnect.app_name, "AutoTrackIr");
        assert!(config.simconnect.library_path.is_none());
        assert!(config.logging.file.ends_with("autotrackir.log"));
    }
}
