use super::Action;
use tokio::sync::watch;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action, cancel: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match action {
        Action::Check { config } => crate::scan::run(&config, cancel).await,
    }
}
