//! SimConnect channel to Microsoft Flight Simulator.
//!
//! The rest of the crate treats the simulator as an opaque request/response
//! channel described by the [`SimConnectClient`] trait. This module provides:
//!
//! - [`SimConnectClient`] - the six operations the control loop needs
//! - [`SimConnectLibrary`] - production client backed by `SimConnect.dll`
//! - [`protocol`] - wire constants and the safe dispatch message parser
//! - [`SimConnectError`] / [`DecodeError`] - channel and decode failures
//!
//! # Architecture
//!
//! ```text
//! Session ──► SimConnectClient ──► SimConnectLibrary ──► SimConnect.dll
//!                    │
//!                    └── get_next_dispatch() -> Vec<u8> ──► protocol::parse_dispatch()
//! ```

mod client;
mod error;
mod library;
pub mod protocol;

pub use client::SimConnectClient;
pub use error::SimConnectError;
pub use library::{default_library_path, SimConnectLibrary, LIBRARY_FILE_NAME};
pub use protocol::{
    parse_dispatch, DataSetFlag, DataType, DecodeError, DispatchMessage, ExceptionInfo,
    ObjectData, OpenInfo, SimObjectType,
};
