use super::{commands, dispatch, telemetry};
use crate::config::{ENV_FILE, load_env_file};
use anyhow::Result;
use std::path::Path;
use clap::error::ErrorKind;
use tokio::sync::watch;
use tracing::warn;

/// Exit code for invocation and runtime failures
pub const EXIT_FAILURE: i32 = 3;

/// Main orchestrator - Pure orchestration with no business logic
///
/// Five-step data flow, after merging `./.env` into the environment:
/// 1. Parse: Extract CLI arguments
/// 2. Extract Verbosity: Convert flag count to logging level
/// 3. Initialize Telemetry: Set up structured logging/tracing
/// 4. Dispatch: Convert `ArgMatches` into typed Action enum
/// 5. Execute: Run the action's business logic
///
/// Returns the process exit code.
///
/// # Errors
///
/// Returns an error if any step in the flow fails
pub async fn start() -> Result<i32> {
    // 0. Environment: merge ./.env before clap reads env fallbacks
    load_env_file(Path::new(ENV_FILE))?;

    // 1. Parse: Extract CLI arguments
    let matches = match commands::new().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            err.print()?;
            return Ok(match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_FAILURE,
            });
        }
    };

    // 2. Extract Verbosity
    let verbosity = matches.get_count("verbose");

    // 3. Initialize Telemetry
    telemetry::init(verbosity)?;

    // 4. Dispatch: Convert ArgMatches into typed Action enum
    let action = dispatch::dispatch(&matches)?;

    // 5. Execute: Run the action's business logic, Ctrl-C cancels pending probes
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling remaining checks");
            let _ = cancel_tx.send(true);
        }
    });

    let result = action.execute(cancel_rx).await;
    interrupt.abort();

    result
}
