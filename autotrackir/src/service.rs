//! Wires the control loop together.
//!
//! [`run_control_loop`] is the whole program minus argument parsing:
//!
//! 1. connect (retrying until the simulator answers)
//! 2. register both variables, exiting on failure
//! 3. route Ctrl+C / SIGTERM into the termination channel
//! 4. poll until a shutdown request, then close the session once
//!
//! Steps 1-2 are [`connect_and_register`], steps 3-4 [`run_registered`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::dispatch::DispatchDecoder;
use crate::error::AutoTrackError;
use crate::lifecycle::{LifecycleCoordinator, ShutdownReason};
use crate::log::{Logger, TracingLogger};
use crate::poller::{Poller, PollerConfig};
use crate::reaction::ReactionPolicy;
use crate::session::Session;
use crate::simconnect::{default_library_path, SimConnectClient, SimConnectLibrary};
use crate::simvar::RegistrationHandle;

/// Runtime settings for one control loop run.
#[derive(Debug, Clone)]
pub struct ControlLoopConfig {
    pub app_name: String,
    pub retry_interval: Duration,
    pub poll_interval: Duration,
    pub log_debounce: Duration,
    /// Install the Ctrl+C / SIGTERM handler.
    pub handle_signals: bool,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self::from(&ConfigFile::default())
    }
}

impl From<&ConfigFile> for ControlLoopConfig {
    fn from(config: &ConfigFile) -> Self {
        Self {
            app_name: config.simconnect.app_name.clone(),
            retry_interval: config.simconnect.retry_interval(),
            poll_interval: config.poll.interval(),
            log_debounce: config.reaction.log_debounce(),
            handle_signals: true,
        }
    }
}

/// Load `SimConnect.dll` from the configured path, or next to the executable.
pub fn load_library(config: &ConfigFile) -> Result<SimConnectLibrary, AutoTrackError> {
    let path: PathBuf = config
        .simconnect
        .library_path
        .clone()
        .unwrap_or_else(default_library_path);
    SimConnectLibrary::load(&path).map_err(AutoTrackError::Library)
}

/// Connect to the simulator and register both monitored variables.
///
/// `on_retry` is called after every failed connection attempt. On a
/// registration failure the session is closed before the error is returned.
pub async fn connect_and_register<C, F>(
    client: C,
    config: &ControlLoopConfig,
    on_retry: F,
) -> Result<(Session<C>, Vec<RegistrationHandle>), AutoTrackError>
where
    C: SimConnectClient,
    F: FnMut(u32),
{
    let mut session =
        Session::connect(client, &config.app_name, config.retry_interval, on_retry).await;

    match session.register_all() {
        Ok(handles) => Ok((session, handles)),
        Err(e) => {
            if let Err(close_error) = session.close() {
                warn!(error = %close_error, "Failed to close SimConnect session");
            }
            Err(e.into())
        }
    }
}

/// Poll a registered session until the simulator quits or the process is
/// asked to stop. The session is closed before this returns.
pub async fn run_registered<C>(
    session: Session<C>,
    handles: &[RegistrationHandle],
    config: &ControlLoopConfig,
) -> Result<ShutdownReason, AutoTrackError>
where
    C: SimConnectClient + 'static,
{
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
    let policy = ReactionPolicy::with_log_debounce(logger.clone(), config.log_debounce);
    let decoder = DispatchDecoder::new(logger);

    let coordinator = LifecycleCoordinator::new();
    if config.handle_signals {
        if let Err(e) = coordinator.install_signal_handler() {
            let e = AutoTrackError::from(e);
            if e.is_fatal() {
                return Err(e);
            }
            warn!(error = %e, "Continuing without Ctrl+C handling");
        }
    }

    let poller = Poller::new(
        session,
        policy,
        decoder,
        handles,
        PollerConfig {
            interval: config.poll_interval,
        },
        coordinator.sender(),
    );

    info!("Monitoring TrackIR state");
    let reason = coordinator.run(poller).await;
    info!(?reason, "AutoTrackIR stopped");
    Ok(reason)
}

/// [`connect_and_register`] followed by [`run_registered`].
pub async fn run_control_loop<C, F>(
    client: C,
    config: &ControlLoopConfig,
    on_retry: F,
) -> Result<ShutdownReason, AutoTrackError>
where
    C: SimConnectClient + 'static,
    F: FnMut(u32),
{
    let (session, handles) = connect_and_register(client, config, on_retry).await?;
    run_registered(session, &handles, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_config_from_file() {
        let mut file = ConfigFile::default();
        file.simconnect.app_name = "Tracker".to_string();
        file.poll.interval_ms = 500;
        file.reaction.log_debounce_secs = 30;

        let config = ControlLoopConfig::from(&file);

        assert_eq!(config.app_name, "Tracker");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.log_debounce, Duration::from_secs(30));
        assert_eq!(config.retry_interval, Duration::from_secs(1));
        assert!(config.handle_signals);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_load_library_unsupported_off_windows() {
        let result = load_library(&ConfigFile::default());
        assert!(matches!(
            result,
            Err(AutoTrackError::Library(
                crate::simconnect::SimConnectError::Unsupported
            ))
        ));
    }
}
