//! The simulation variables AutoTrackIR watches.
//!
//! Exactly two variables are monitored. Both are declared as `FLOAT64`
//! because SimConnect samples every value through the same data path,
//! whatever its semantic type.

use thiserror::Error;

use crate::session::SessionError;
use crate::simconnect::DataType;

/// Data definition id of a monitored variable.
///
/// Also the correlation key between a data request and the sample that
/// answers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SimVarId {
    /// `TRACK IR ENABLE` (Bool)
    TrackIrEnable = 0,
    /// `CAMERA STATE` (Enum)
    CameraState = 1,
}

impl SimVarId {
    /// SimConnect data definition id.
    pub const fn define_id(self) -> u32 {
        self as u32
    }

    /// Reverse of [`SimVarId::define_id`].
    pub fn from_define_id(define_id: u32) -> Option<Self> {
        match define_id {
            0 => Some(SimVarId::TrackIrEnable),
            1 => Some(SimVarId::CameraState),
            _ => None,
        }
    }
}

/// A simulation variable sampled every poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoredVariable {
    pub id: SimVarId,
    pub name: &'static str,
    pub unit: &'static str,
}

/// Whether TrackIR input is currently enabled in the simulator.
pub const TRACK_IR_ENABLE: MonitoredVariable = MonitoredVariable {
    id: SimVarId::TrackIrEnable,
    name: "TRACK IR ENABLE",
    unit: "Bool",
};

/// Active camera (cockpit, external, drone, ...).
pub const CAMERA_STATE: MonitoredVariable = MonitoredVariable {
    id: SimVarId::CameraState,
    name: "CAMERA STATE",
    unit: "Enum",
};

/// Registration and polling order.
pub const MONITORED_VARIABLES: [MonitoredVariable; 2] = [TRACK_IR_ENABLE, CAMERA_STATE];

/// Value type every monitored variable is declared with.
pub const SAMPLE_DATA_TYPE: DataType = DataType::Float64;

/// Proof that a variable was accepted by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationHandle {
    pub id: SimVarId,
    pub data_type: DataType,
}

/// The session rejected a variable declaration. Fatal at startup.
#[derive(Debug, Error)]
#[error("Failed to register simulation variable '{name}' (definition {define_id}): {source}")]
pub struct RegistrationError {
    pub name: &'static str,
    pub define_id: u32,
    #[source]
    pub source: SessionError,
}
