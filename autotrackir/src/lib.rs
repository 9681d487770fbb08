//! AutoTrackIR - keeps TrackIR enabled in Microsoft Flight Simulator.
//!
//! MSFS turns `TRACK IR ENABLE` off during some camera transitions. This
//! library connects to the simulator over SimConnect, polls the TrackIR and
//! camera state every 350 ms and writes TrackIR back on whenever the
//! simulator disabled it in a flying camera.
//!
//! # High-Level API
//!
//! ```ignore
//! use autotrackir::config::ConfigFile;
//! use autotrackir::service::{load_library, run_control_loop, ControlLoopConfig};
//!
//! let config = ConfigFile::load()?;
//! let library = load_library(&config)?;
//! let reason = run_control_loop(library, &ControlLoopConfig::from(&config), |_| {}).await?;
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod log;
pub mod logging;
pub mod poller;
pub mod reaction;
pub mod service;
pub mod session;
pub mod simconnect;
pub mod simvar;

pub use error::AutoTrackError;

/// Version of the AutoTrackIR library and CLI.
///
/// Synchronized across the workspace and injected from `Cargo.toml` at
/// compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
