use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Log level for a `-v` count
#[must_use]
pub const fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber, logging to stderr
///
/// `RUST_LOG` takes precedence over `verbosity`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(verbosity: u8) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(1), "info");
        assert_eq!(level(2), "debug");
        assert_eq!(level(3), "trace");
        assert_eq!(level(9), "trace");
    }

    #[test]
    fn test_init_twice_fails() {
        let _ = init(0);
        assert!(init(1).is_err());
    }
}
