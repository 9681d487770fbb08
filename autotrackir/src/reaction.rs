//! Reaction policy - turns TrackIR back on when the simulator disables it.
//!
//! MSFS switches `TRACK IR ENABLE` off in some camera transitions. Whenever
//! a sample shows tracking disabled while the camera is in one of the
//! "flying" states (strictly between 1 and 6), the policy writes `1.0` back.
//!
//! Only the *log line* is debounced (once per window, 10 s by default). The
//! corrective write happens on every qualifying sample.
//!
//! State is re-derived from the latest samples every tick; the only memory
//! kept is the last camera state and when the notice was last logged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::log::Logger;
use crate::session::CorrectiveWriter;
use crate::simvar::SimVarId;

/// Default minimum interval between "disabled by simulator" notices.
pub const DEFAULT_LOG_DEBOUNCE: Duration = Duration::from_secs(10);

/// Value written to re-enable TrackIR.
pub const CORRECTION_VALUE: f64 = 1.0;

/// Camera state before any sample has arrived.
pub const CAMERA_STATE_UNKNOWN: u32 = 0;

/// Camera states that trigger a correction lie strictly between these.
const CAMERA_STATE_LOWER_BOUND: u32 = 1;
const CAMERA_STATE_UPPER_BOUND: u32 = 6;

/// One decoded sample routed to the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableUpdate {
    pub variable: SimVarId,
    pub object_id: u32,
    pub value: f64,
}

/// What the policy did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing to do.
    Ignored,
    /// Camera state recorded.
    CameraStateUpdated(u32),
    /// A corrective write was issued.
    Corrected {
        /// The throttled notice was logged for this correction.
        logged: bool,
        /// The write succeeded.
        write_ok: bool,
    },
}

/// Mutable state shared by consecutive samples.
#[derive(Debug, Clone, Default)]
pub struct ReactionState {
    camera_state: u32,
    last_notice: Option<Instant>,
}

impl ReactionState {
    pub fn camera_state(&self) -> u32 {
        self.camera_state
    }

    /// When the "disabled by simulator" notice was last logged.
    pub fn last_notice(&self) -> Option<Instant> {
        self.last_notice
    }
}

/// True when a tracking sample of `tracking_value` under `camera_state`
/// must be corrected.
pub fn should_correct(tracking_value: f64, camera_state: u32) -> bool {
    tracking_value == 0.0
        && camera_state > CAMERA_STATE_LOWER_BOUND
        && camera_state < CAMERA_STATE_UPPER_BOUND
}

/// Decides on and issues corrective writes.
pub struct ReactionPolicy {
    state: ReactionState,
    log_debounce: Duration,
    logger: Arc<dyn Logger>,
}

impl ReactionPolicy {
    /// Policy with the default 10 s notice debounce.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_log_debounce(logger, DEFAULT_LOG_DEBOUNCE)
    }

    pub fn with_log_debounce(logger: Arc<dyn Logger>, log_debounce: Duration) -> Self {
        Self {
            state: ReactionState::default(),
            log_debounce,
            logger,
        }
    }

    pub fn state(&self) -> &ReactionState {
        &self.state
    }

    /// Handle one sample observed at `now`.
    pub fn on_variable_update<W>(
        &mut self,
        writer: &mut W,
        update: VariableUpdate,
        now: Instant,
    ) -> Reaction
    where
        W: CorrectiveWriter + ?Sized,
    {
        match update.variable {
            SimVarId::CameraState => {
                // Saturating: negative or NaN samples read as 0.
                let camera_state = update.value as u32;
                self.state.camera_state = camera_state;
                Reaction::CameraStateUpdated(camera_state)
            }
            SimVarId::TrackIrEnable => self.on_tracking_sample(writer, update, now),
        }
    }

    fn on_tracking_sample<W>(
        &mut self,
        writer: &mut W,
        update: VariableUpdate,
        now: Instant,
    ) -> Reaction
    where
        W: CorrectiveWriter + ?Sized,
    {
        if !should_correct(update.value, self.state.camera_state) {
            return Reaction::Ignored;
        }

        let logged = self.notice_due(now);
        if logged {
            self.state.last_notice = Some(now);
            crate::log_info!(
                self.logger,
                "TrackIR disabled by simulator (camera state {})",
                self.state.camera_state
            );
        }

        let result = writer.write_value(SimVarId::TrackIrEnable, update.object_id, CORRECTION_VALUE);

        if logged {
            crate::log_info!(self.logger, "TrackIR re-enabled");
        }

        let write_ok = match result {
            Ok(()) => true,
            Err(e) => {
                crate::log_error!(
                    self.logger,
                    "Failed to re-enable TrackIR on object {}: {}",
                    update.object_id,
                    e
                );
                false
            }
        };

        Reaction::Corrected { logged, write_ok }
    }

    fn notice_due(&self, now: Instant) -> bool {
        match self.state.last_notice {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.log_debounce,
        }
    }
}
