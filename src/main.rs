//! Continuous Release - keeps the rolling `continuous` release at the latest build commit.
//!
//! Exits 0 when the release is current after the run (including no-op and
//! dry run) and 1 on any fatal error.

use continuous_release::cli;
use continuous_release::cli::{OutputManager, RuntimeConfig};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let config = RuntimeConfig::new(OutputManager::new(true, false));
            cli::report_failure(&e, &config);
            process::exit(1);
        }
    }
}
