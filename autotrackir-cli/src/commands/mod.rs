//! CLI command implementations.
//!
//! - [`init`] - Configuration initialization
//! - [`run`] - Main command (watch TrackIR until the simulator exits)

pub mod init;
pub mod run;
