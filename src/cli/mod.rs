//! Command-line interface definitions for the `tether` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `tether` binary.
#[derive(Debug, Parser)]
#[command(
    name = "tether",
    about = "Copy a source value into many targets, one frame at a time",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Run a counting source into a set of targets on the frame clock.
    #[command(
        name = "demo",
        about = "Run a counting source into a set of targets on the frame clock"
    )]
    Demo(DemoCommand),
    /// Print the effective configuration as JSON.
    #[command(name = "config", about = "Print the effective configuration as JSON")]
    Config,
}

/// Arguments for the `tether demo` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct DemoCommand {
    /// Number of targets registered with the handler.
    #[arg(long, value_name = "COUNT", default_value_t = 3)]
    pub(crate) targets: usize,
    /// Override how long the loop runs, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub(crate) duration_ms: Option<u64>,
    /// Override the period between frames, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub(crate) frame_interval_ms: Option<u64>,
    /// Free the loop as soon as a copy fails.
    #[arg(long)]
    pub(crate) stop_on_error: bool,
}
