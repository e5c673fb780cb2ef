//! Command line interface for continuous_release.
//!
//! Parses arguments, runs the reconciliation and turns its result into a
//! process exit code.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::{execute_command, execute_with_api, report_failure};
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
