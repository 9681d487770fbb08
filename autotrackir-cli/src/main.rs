//! AutoTrackIR CLI - keeps TrackIR enabled while flying in MSFS.
//!
//! `autotrackir` (or `autotrackir run`) waits for the simulator, then
//! watches TrackIR until the simulator exits or Ctrl+C is pressed.
//! `autotrackir init` writes a default configuration file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "autotrackir")]
#[command(version = autotrackir::VERSION)]
#[command(about = "Keep TrackIR enabled in Microsoft Flight Simulator", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.autotrackir/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Override the poll interval in milliseconds
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the simulator and keep TrackIR enabled (default)
    Run,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(RunArgs {
            config: cli.config,
            debug: cli.debug,
            poll_interval_ms: cli.poll_interval_ms,
        }),
        Commands::Init { force } => commands::init::run(cli.config, force),
    };

    if let Err(e) = result {
        e.exit();
    }
}
