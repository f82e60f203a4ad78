use anyhow::{Result, bail};
use std::time::Duration;

/// Default TLS port probed for every domain
pub const DEFAULT_PORT: u16 = 443;

/// Settings shared by every probe of one engine run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Bound on TCP connect plus TLS handshake, per domain
    pub timeout: Duration,
    /// Number of workers pulling from the domain queue
    pub concurrency: usize,
    /// Days at or below which a valid certificate is flagged as a warning
    pub warning_days: u32,
    pub port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            concurrency: 10,
            warning_days: 30,
            port: DEFAULT_PORT,
        }
    }
}

impl ProbeConfig {
    /// Build a probe configuration from raw invocation values
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout or concurrency is not positive or the
    /// threshold is negative
    pub fn new(
        timeout_secs: i64,
        concurrency: i64,
        threshold_days: i64,
        port: u16,
    ) -> Result<Self> {
        if timeout_secs <= 0 {
            bail!("timeout must be greater than 0");
        }
        if concurrency <= 0 {
            bail!("concurrent must be greater than 0");
        }
        if threshold_days < 0 {
            bail!("threshold must be non-negative");
        }
        if port == 0 {
            bail!("port must be greater than 0");
        }

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs.unsigned_abs()),
            concurrency: usize::try_from(concurrency)?,
            warning_days: u32::try_from(threshold_days)?,
            port,
        })
    }
}
