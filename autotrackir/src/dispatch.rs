//! Dispatch decoder - reads and routes messages from the simulator.
//!
//! [`DispatchDecoder::poll_once`] takes at most one message off the session
//! queue. [`DispatchDecoder::drain`] keeps reading until the queue is empty
//! or a message ends the drain:
//!
//! | Message       | Action                                  | Keep draining |
//! |---------------|-----------------------------------------|---------------|
//! | `Open`        | log the connection                      | yes           |
//! | `Exception`   | log the exception code                  | yes           |
//! | `Quit`        | report [`DrainOutcome::Quit`]           | no            |
//! | `ObjectData`  | hand the sample to the reaction policy  | no            |
//! | other         | log the raw bytes                       | no            |
//!
//! An empty queue is the normal state between responses and is never
//! logged. Read and decode failures are logged and treated as an empty
//! queue.

use std::sync::Arc;
use std::time::Instant;

use crate::log::Logger;
use crate::reaction::{Reaction, ReactionPolicy, VariableUpdate};
use crate::session::Session;
use crate::simconnect::{parse_dispatch, DispatchMessage, ObjectData, SimConnectClient};
use crate::simvar::SimVarId;

/// Upper bound on messages read by a single [`DispatchDecoder::drain`].
pub const MAX_DRAIN_MESSAGES: usize = 32;

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing (more) to act on.
    Quiescent,
    /// A sample reached the reaction policy.
    Delivered(Reaction),
    /// The simulator is shutting down.
    Quit,
}

/// Reads dispatch messages from a session.
pub struct DispatchDecoder {
    logger: Arc<dyn Logger>,
}

impl DispatchDecoder {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Take and decode the next message, if one is ready.
    pub fn poll_once<C: SimConnectClient>(
        &self,
        session: &mut Session<C>,
    ) -> Option<DispatchMessage> {
        let raw = match session.next_dispatch() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                crate::log_error!(self.logger, "GetNextDispatch error: {}", e);
                return None;
            }
        };

        match parse_dispatch(&raw) {
            Ok(message) => Some(message),
            Err(e) => {
                crate::log_error!(self.logger, "Failed to decode dispatch message: {}", e);
                None
            }
        }
    }

    /// Read messages until the queue is empty or a message ends the drain.
    pub fn drain<C: SimConnectClient>(
        &self,
        session: &mut Session<C>,
        policy: &mut ReactionPolicy,
        now: Instant,
    ) -> DrainOutcome {
        for _ in 0..MAX_DRAIN_MESSAGES {
            let Some(message) = self.poll_once(session) else {
                return DrainOutcome::Quiescent;
            };

            match &message {
                DispatchMessage::Open(info) => {
                    crate::log_info!(
                        self.logger,
                        "Connected to {} (version {}.{}, SimConnect {}.{})",
                        info.application_name,
                        info.application_version.0,
                        info.application_version.1,
                        info.simconnect_version.0,
                        info.simconnect_version.1
                    );
                }
                DispatchMessage::Exception(exception) => {
                    crate::log_warn!(
                        self.logger,
                        "SimConnect exception {} (send id {}, parameter {})",
                        exception.code,
                        exception.send_id,
                        exception.index
                    );
                }
                DispatchMessage::Quit => {
                    crate::log_info!(self.logger, "Disconnected from simulator");
                    return DrainOutcome::Quit;
                }
                DispatchMessage::ObjectData(data) => {
                    return self.deliver(session, policy, *data, now);
                }
                DispatchMessage::Unknown { id, raw } => {
                    crate::log_debug!(
                        self.logger,
                        "Ignoring dispatch message id {} ({} bytes): {:02x?}",
                        id,
                        raw.len(),
                        message.raw_preview().unwrap_or_default()
                    );
                    return DrainOutcome::Quiescent;
                }
            }
        }

        crate::log_debug!(
            self.logger,
            "Stopped draining after {} messages",
            MAX_DRAIN_MESSAGES
        );
        DrainOutcome::Quiescent
    }

    fn deliver<C: SimConnectClient>(
        &self,
        session: &mut Session<C>,
        policy: &mut ReactionPolicy,
        data: ObjectData,
        now: Instant,
    ) -> DrainOutcome {
        let Some(variable) = SimVarId::from_define_id(data.define_id) else {
            crate::log_warn!(
                self.logger,
                "Sample for unknown data definition {} (request {})",
                data.define_id,
                data.request_id
            );
            return DrainOutcome::Quiescent;
        };

        let update = VariableUpdate {
            variable,
            object_id: data.object_id,
            value: data.value,
        };
        DrainOutcome::Delivered(policy.on_variable_update(session, update, now))
    }
}
