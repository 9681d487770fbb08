//! CLI runner for common setup.
//!
//! Loads the configuration and initializes logging before a command runs.

use std::path::Path;

use tracing::info;

use autotrackir::config::ConfigFile;
use autotrackir::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load the configuration (from `config_path` or the default location)
    /// and initialize logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging unless RUST_LOG says otherwise
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let logging_guard = init_logging(&config.logging.file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Command-line overrides go through here.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("AutoTrackIR v{}", autotrackir::VERSION);
        info!("AutoTrackIR CLI: {} command", command);
        info!(
            log_file = %self.config.logging.file.display(),
            poll_interval_ms = self.config.poll.interval_ms,
            "Configuration loaded"
        );
    }
}
