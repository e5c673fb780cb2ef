//! Command execution: resolve settings, reconcile, map the result to an exit code.

mod reconcile;

use crate::cli::{Args, RuntimeConfig};
use crate::config::EnvConfig;
use crate::error::{ReleaseError, Result};

pub use reconcile::execute_with_api;

/// Execute the reconciliation described by the parsed arguments.
///
/// Returns the process exit code: 0 on success (no-op and dry run included),
/// 1 on any fatal error after it has been reported.
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    if let Err(validation_error) = args.validate() {
        config.error_println(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let env = EnvConfig::from_process();
    match reconcile::execute_reconcile(&args, &env, &config).await {
        Ok(()) => Ok(0),
        Err(e) => {
            report_failure(&e, &config);
            Ok(1)
        }
    }
}

/// Print a fatal error and its recovery suggestions as [ERROR] lines
pub fn report_failure(error: &ReleaseError, config: &RuntimeConfig) {
    config.error_println(&error.to_string());
    for suggestion in error.recovery_suggestions() {
        config.error_println(&suggestion);
    }
}
