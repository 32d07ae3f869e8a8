//! CLI argument definitions.
//!
//! All Clap derive structs for `tideloop` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::observability::logging::{ColorChoice, LogFormat};

// ============================================================================
// Root CLI
// ============================================================================

/// Headless looping narrative animation engine.
#[derive(Parser, Debug)]
#[command(name = "tideloop", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "TIDELOOP_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "TIDELOOP_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the animation engine headlessly.
    Run(RunArgs),

    /// Validate configuration files without running the engine.
    Validate(ValidateArgs),

    /// Display version information.
    Version,
}

// ============================================================================
// Run Command
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML scene configuration (defaults otherwise).
    #[arg(short, long, env = "TIDELOOP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop after this long instead of running until Ctrl+C.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Override the particle RNG seed for a reproducible run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Capture every render operation to an NDJSON file.
    #[arg(long)]
    pub capture: Option<PathBuf>,
}

// ============================================================================
// Validate Command
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
