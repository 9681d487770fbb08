//! Error types for the SimConnect channel.

use thiserror::Error;

/// HRESULT returned by `SimConnect_GetNextDispatch` when the queue is empty.
pub const E_FAIL: u32 = 0x8000_4005;

/// Errors raised by a [`super::SimConnectClient`].
#[derive(Debug, Error)]
pub enum SimConnectError {
    /// A SimConnect call returned a failing HRESULT.
    #[error("{operation} failed with HRESULT 0x{hresult:08X}")]
    Call {
        operation: &'static str,
        hresult: u32,
    },

    /// The client has no open handle.
    #[error("SimConnect handle is not open")]
    NotOpen,

    /// The native library could not be loaded.
    #[error("Failed to load SimConnect library from {path}: {reason}")]
    LibraryLoad { path: String, reason: String },

    /// The native library does not export a required function.
    #[error("SimConnect library does not export {symbol}: {reason}")]
    MissingSymbol {
        symbol: &'static str,
        reason: String,
    },

    /// A string argument cannot be passed to C.
    #[error("Argument contains an interior NUL byte: {0:?}")]
    InvalidString(String),

    /// SimConnect only exists on Windows.
    #[error("SimConnect is only available on Windows")]
    Unsupported,
}

impl SimConnectError {
    /// HRESULT carried by a failed call, if any.
    pub fn hresult(&self) -> Option<u32> {
        match self {
            SimConnectError::Call { hresult, .. } => Some(*hresult),
            _ => None,
        }
    }
}

/// Map a raw HRESULT to a `Result`. Negative values are failures.
pub(crate) fn check_hresult(operation: &'static str, hresult: i32) -> Result<(), SimConnectError> {
    if hresult < 0 {
        Err(SimConnectError::Call {
            operation,
            hresult: hresult as u32,
        })
    } else {
        Ok(())
    }
}
