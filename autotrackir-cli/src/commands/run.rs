//! Run command - connect to the simulator and keep TrackIR enabled.

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use autotrackir::config::MIN_POLL_INTERVAL_MS;
use autotrackir::service::{
    connect_and_register, load_library, run_registered, ControlLoopConfig,
};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub poll_interval_ms: Option<u64>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(args.config.as_deref(), args.debug)?;

    if let Some(interval_ms) = args.poll_interval_ms {
        if interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(CliError::Config(format!(
                "--poll-interval-ms must be at least {}",
                MIN_POLL_INTERVAL_MS
            )));
        }
        runner.config_mut().poll.interval_ms = interval_ms;
    }

    runner.log_startup("run");

    let library = load_library(runner.config())?;
    let loop_config = ControlLoopConfig::from(runner.config());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let reason = runtime.block_on(async {
        let (session, handles) = connect_and_register(library, &loop_config, |_attempt| {
            print!(".");
            flush_stdout();
        })
        .await?;
        println!();
        run_registered(session, &handles, &loop_config).await
    })?;

    info!(?reason, "Exiting");
    Ok(())
}

fn flush_stdout() {
    // Progress output only.
    let _ = std::io::stdout().flush();
}
