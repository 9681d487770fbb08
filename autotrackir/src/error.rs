//! Top-level error type for the control loop.
//!
//! Failures fall into four classes:
//!
//! | Class                 | Example                          | Handling                     |
//! |-----------------------|----------------------------------|------------------------------|
//! | `FatalStartup`        | a variable cannot be registered  | returned, process exits      |
//! | `RecoverableDispatch` | a truncated dispatch message     | logged, loop continues       |
//! | `RecoverableWrite`    | the corrective write failed      | logged, next tick retries    |
//! | `ExternalQuit`        | the simulator sent `Quit`        | orderly shutdown, not error  |
//!
//! Only startup failures ever reach [`AutoTrackError`]; the recoverable
//! classes are logged where they happen and never leave the poll loop.

use thiserror::Error;

use crate::config::ConfigFileError;
use crate::lifecycle::LifecycleError;
use crate::logging::LoggingError;
use crate::simconnect::SimConnectError;
use crate::simvar::RegistrationError;

/// Errors that stop AutoTrackIR from starting.
#[derive(Debug, Error)]
pub enum AutoTrackError {
    /// `SimConnect.dll` could not be loaded.
    #[error("SimConnect library unavailable: {0}")]
    Library(#[source] SimConnectError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Config(#[from] ConfigFileError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl AutoTrackError {
    /// Whether the process must exit.
    ///
    /// Without a signal handler the loop still runs; it just cannot be
    /// stopped gracefully with Ctrl+C.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AutoTrackError::Lifecycle(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionError;

    #[test]
    fn test_registration_failure_is_fatal() {
        let err: AutoTrackError = RegistrationError {
            name: "CAMERA STATE",
            define_id: 1,
            source: SessionError::NotConnected,
        }
        .into();

        assert!(err.is_fatal());
        assert!(err.to_string().contains("CAMERA STATE"));
    }

    #[test]
    fn test_missing_library_is_fatal() {
        let err = AutoTrackError::Library(SimConnectError::Unsupported);
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("SimConnect library unavailable"));
    }

    #[test]
    fn test_signal_handler_failure_is_not_fatal() {
        let err: AutoTrackError =
            LifecycleError::SignalHandler(ctrlc::Error::MultipleHandlers).into();
        assert!(!err.is_fatal());
    }
}
