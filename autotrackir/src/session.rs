//! Session manager - owns the SimConnect connection.
//!
//! A [`Session`] wraps one [`SimConnectClient`] and tracks its lifecycle:
//!
//! ```text
//! Disconnected ──connect()──► Connected ──close()──► Closed
//! ```
//!
//! Requests, dispatch reads and writes are refused unless the session is
//! `Connected`. [`Session::connect`] waits for the simulator indefinitely;
//! MSFS can take minutes to load and there is nothing useful to do until it
//! answers.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::simconnect::{DataSetFlag, SimConnectClient, SimConnectError, SimObjectType};
use crate::simvar::{
    MonitoredVariable, RegistrationError, RegistrationHandle, SimVarId, MONITORED_VARIABLES,
    SAMPLE_DATA_TYPE,
};

/// Default delay between connection attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Radius for data requests: 0 restricts them to the user's own aircraft.
const USER_OBJECT_RADIUS: u32 = 0;

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Closed,
}

/// Identifier of a data request. Strictly increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u32);

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session has not been opened, or has been closed.
    #[error("SimConnect session is not connected")]
    NotConnected,

    /// `close` was called a second time.
    #[error("SimConnect session is already closed")]
    AlreadyClosed,

    /// The underlying client reported a failure.
    #[error(transparent)]
    SimConnect(#[from] SimConnectError),
}

/// Something the reaction policy can write corrective values through.
pub trait CorrectiveWriter {
    /// Write one `f64` to `variable` on object `object_id`.
    fn write_value(
        &mut self,
        variable: SimVarId,
        object_id: u32,
        value: f64,
    ) -> Result<(), SessionError>;
}

/// Live connection to the simulator.
pub struct Session<C> {
    client: C,
    state: SessionState,
    last_request_id: u32,
}

impl<C: SimConnectClient> Session<C> {
    /// Wrap a client that has not been opened yet.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: SessionState::Disconnected,
            last_request_id: 0,
        }
    }

    /// Open a session, retrying every `retry_interval` until the simulator
    /// accepts it.
    ///
    /// `on_retry` is called with the attempt number after each failure so
    /// callers can show progress. There is no attempt limit.
    pub async fn connect<F>(
        client: C,
        app_name: &str,
        retry_interval: Duration,
        mut on_retry: F,
    ) -> Self
    where
        F: FnMut(u32),
    {
        let mut session = Self::new(client);
        let mut failed_attempts: u32 = 0;

        info!(app_name, "Waiting for simulator to be ready...");

        loop {
            match session.try_open(app_name) {
                Ok(()) => break,
                Err(e) => {
                    failed_attempts = failed_attempts.saturating_add(1);
                    debug!(attempt = failed_attempts, error = %e, "Simulator not ready");
                    on_retry(failed_attempts);
                    tokio::time::sleep(retry_interval).await;
                }
            }
        }

        info!(
            app_name,
            attempts = failed_attempts.saturating_add(1),
            "SimConnect session opened"
        );
        session
    }

    /// Single connection attempt.
    pub fn try_open(&mut self, app_name: &str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Connected => return Ok(()),
            SessionState::Closed => return Err(SessionError::AlreadyClosed),
            SessionState::Disconnected => {}
        }
        self.client.open(app_name)?;
        self.state = SessionState::Connected;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Access the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Declare `variable` to the simulator as a `FLOAT64` data definition.
    pub fn register(
        &mut self,
        variable: &MonitoredVariable,
    ) -> Result<RegistrationHandle, RegistrationError> {
        let define_id = variable.id.define_id();
        let to_registration_error = |source: SessionError| RegistrationError {
            name: variable.name,
            define_id,
            source,
        };

        self.ensure_connected().map_err(to_registration_error)?;
        self.client
            .add_to_data_definition(define_id, variable.name, variable.unit, SAMPLE_DATA_TYPE)
            .map_err(|e| to_registration_error(e.into()))?;

        debug!(
            name = variable.name,
            unit = variable.unit,
            define_id,
            "Registered simulation variable"
        );

        Ok(RegistrationHandle {
            id: variable.id,
            data_type: SAMPLE_DATA_TYPE,
        })
    }

    /// Register every monitored variable in order.
    ///
    /// Stops at the first failure; variables already registered stay
    /// registered.
    pub fn register_all(&mut self) -> Result<Vec<RegistrationHandle>, RegistrationError> {
        MONITORED_VARIABLES
            .iter()
            .map(|variable| self.register(variable))
            .collect()
    }

    /// Request one sample of `variable` from the user's aircraft.
    pub fn request_data(&mut self, variable: SimVarId) -> Result<RequestId, SessionError> {
        self.ensure_connected()?;
        let request_id = self.allocate_request_id();
        self.client.request_data_on_sim_object_type(
            request_id.0,
            variable.define_id(),
            USER_OBJECT_RADIUS,
            SimObjectType::User,
        )?;
        Ok(request_id)
    }

    /// Raw bytes of the next queued message, if any.
    pub fn next_dispatch(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        self.ensure_connected()?;
        Ok(self.client.get_next_dispatch()?)
    }

    /// Write a single `f64` to `variable` on `object_id`.
    pub fn write_f64(
        &mut self,
        variable: SimVarId,
        object_id: u32,
        value: f64,
    ) -> Result<(), SessionError> {
        self.ensure_connected()?;
        self.client.set_data_on_sim_object(
            variable.define_id(),
            object_id,
            DataSetFlag::Default,
            0,
            &value.to_le_bytes(),
        )?;
        Ok(())
    }

    /// Close the connection.
    ///
    /// Only the first call on a connected session reaches the client.
    pub fn close(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Disconnected => Err(SessionError::NotConnected),
            SessionState::Closed => Err(SessionError::AlreadyClosed),
            SessionState::Connected => {
                self.state = SessionState::Closed;
                self.client.close()?;
                info!("SimConnect session closed");
                Ok(())
            }
        }
    }

    fn ensure_connected(&self) -> Result<(), SessionError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    fn allocate_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        RequestId(self.last_request_id)
    }
}

impl<C: SimConnectClient> CorrectiveWriter for Session<C> {
    fn write_value(
        &mut self,
        variable: SimVarId,
        object_id: u32,
        value: f64,
    ) -> Result<(), SessionError> {
        self.write_f64(variable, object_id, value)
    }
}
