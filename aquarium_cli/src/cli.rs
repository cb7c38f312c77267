//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "aquarium", version, about = "Aquarium telemetry simulator and service")]
pub struct Cli {
    /// Path to config TOML (a missing file means defaults)
    #[arg(long, value_name = "FILE", default_value = "etc/aquarium.toml")]
    pub config: PathBuf,

    /// Log and print as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulation, HTTP API, chat bot and remote sync until Ctrl-C
    Serve {
        /// Override `server.bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
        /// Do not start the chat bot even if a token is configured
        #[arg(long, action = ArgAction::SetTrue)]
        no_bot: bool,
        /// Do not publish the status document
        #[arg(long, action = ArgAction::SetTrue)]
        no_sync: bool,
    },
    /// Run simulation ticks offline against a virtual clock and print each status
    Simulate {
        /// Number of ticks to run
        #[arg(long, default_value_t = 60)]
        ticks: u32,
        /// Virtual start time of day (HH:MM)
        #[arg(long, value_name = "HH:MM", default_value = "12:00")]
        start: String,
        /// RNG seed (overrides `simulation.seed`)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load and validate the config, then print the effective settings
    CheckConfig,
}
