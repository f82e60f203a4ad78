mod run;

use crate::config::Config;
use tokio::sync::watch;

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Check { config: Config },
}

impl Action {
    /// Execute the action, returning the process exit code
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self, cancel: watch::Receiver<bool>) -> anyhow::Result<i32> {
        run::execute(self, cancel).await
    }
}
