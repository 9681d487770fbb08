//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use autotrackir::config::ConfigFileError;
use autotrackir::simconnect::{SimConnectError, LIBRARY_FILE_NAME};
use autotrackir::AutoTrackError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// The control loop could not start
    ControlLoop(AutoTrackError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::ControlLoop(AutoTrackError::Library(SimConnectError::Unsupported)) => {
                eprintln!();
                eprintln!("AutoTrackIR talks to MSFS through SimConnect, which is Windows-only.");
            }
            CliError::ControlLoop(AutoTrackError::Library(_)) => {
                eprintln!();
                eprintln!("Make sure {} is available:", LIBRARY_FILE_NAME);
                eprintln!("  1. Copy it from the MSFS SDK (SimConnect SDK/lib) next to autotrackir.exe");
                eprintln!("  2. Or set library_path in the [simconnect] section of config.ini");
            }
            CliError::ControlLoop(AutoTrackError::Registration(_)) => {
                eprintln!();
                eprintln!("The simulator rejected a variable definition.");
                eprintln!("Check that the running simulator supports TrackIR.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'autotrackir init --force' to write a fresh configuration file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::ControlLoop(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::ControlLoop(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AutoTrackError> for CliError {
    fn from(e: AutoTrackError) -> Self {
        match e {
            AutoTrackError::Config(e) => e.into(),
            AutoTrackError::Logging(e) => CliError::LoggingInit(e.to_string()),
            other => CliError::ControlLoop(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err: CliError = ConfigFileError::InvalidValue {
            section: "poll".to_string(),
            key: "interval_ms".to_string(),
            value: "fast".to_string(),
            reason: "must be an integer".to_string(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration: poll.interval_ms = 'fast' - must be an integer"
        );
    }

    #[test]
    fn test_library_error_keeps_source() {
        let err: CliError = AutoTrackError::Library(SimConnectError::Unsupported).into();
        assert!(matches!(err, CliError::ControlLoop(AutoTrackError::Library(_))));
        assert!(std::error::Error::source(&err).is_some());
    }
}
