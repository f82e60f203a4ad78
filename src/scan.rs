//! One complete check: discover, probe, filter, sort, render

use crate::{
    checker::Checker,
    config::Config,
    models::{Certificate, CertificateReport},
    output::get_formatter,
    provider::ProviderFactory,
};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};
use tokio::sync::watch;
use tracing::info;

/// Run a check and print the report to stdout
///
/// Returns the process exit code for the report.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, domains cannot be
/// resolved, no domains are found or the report cannot be written
pub async fn run(config: &Config, cancel: watch::Receiver<bool>) -> Result<i32> {
    let mut stdout = io::stdout();
    run_with_output(config, cancel, &mut stdout).await
}

/// Same as [`run`], writing the report to `out`
///
/// # Errors
///
/// See [`run`]
pub async fn run_with_output(
    config: &Config,
    cancel: watch::Receiver<bool>,
    out: &mut (dyn Write + Send),
) -> Result<i32> {
    config.validate().context("invalid configuration")?;
    let format = config.output_format()?;
    let checker = Checker::new(config.probe_config()?)?;

    if config.verbose > 0 {
        eprintln!("{}", config.summary());
    }

    let show_spinner = config.verbose == 0;

    let domains = if config.has_explicit_domains() {
        resolve_domains(config).await
    } else {
        let _spinner = show_spinner.then(|| Spinner::new("Fetching domains from provider..."));
        let mut interrupted = cancel.clone();
        tokio::select! {
            biased;
            Ok(_) = interrupted.wait_for(|cancelled| *cancelled) => bail!("interrupted"),
            domains = resolve_domains(config) => domains,
        }
    }
    .context("failed to get domains")?;

    if domains.is_empty() {
        bail!("no domains to check");
    }

    info!(domains = domains.len(), "found domains to check");

    let certificates = {
        let _spinner = show_spinner.then(|| {
            Spinner::new(&format!(
                "Checking SSL certificates for {} domains...",
                domains.len()
            ))
        });
        checker.check_domains_with_cancel(&domains, cancel).await?
    };

    let mut certificates = filter_expiring(certificates, config.expiring_in);
    sort_certificates(&mut certificates);

    let report = CertificateReport::new(certificates, Utc::now());
    get_formatter(format).format(&report, out)?;
    out.flush()?;

    Ok(report.exit_code())
}

/// Domains to probe: the test domain, else explicit domains, else the provider
///
/// # Errors
///
/// Returns an error if the provider cannot be built or fails to list domains
pub async fn resolve_domains(config: &Config) -> Result<Vec<String>> {
    if let Some(domain) = &config.test_domain {
        return Ok(vec![domain.clone()]);
    }
    if !config.domains.is_empty() {
        return Ok(config.domains.clone());
    }

    let provider = ProviderFactory::from_config(config).create(&config.provider)?;
    match &config.zone {
        Some(zone) => provider.list_domains_in_zone(zone).await,
        None => provider.list_domains().await,
    }
}

/// Keep records with at most `days` days left; `days <= 0` keeps everything
#[must_use]
pub fn filter_expiring(certificates: Vec<Certificate>, days: i64) -> Vec<Certificate> {
    if days <= 0 {
        return certificates;
    }
    certificates
        .into_iter()
        .filter(|cert| cert.days_left <= days)
        .collect()
}

/// Soonest expiry first, ties by domain
pub fn sort_certificates(certificates: &mut [Certificate]) {
    certificates.sort_by(|a, b| {
        a.days_left
            .cmp(&b.days_left)
            .then_with(|| a.domain.cmp(&b.domain))
    });
}

/// Spinner on stderr, hidden when stderr is not a terminal
struct Spinner {
    progress: ProgressBar,
}

impl Spinner {
    fn new(message: &str) -> Self {
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(100));
        Self { progress }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.progress.finish_and_clear();
    }
}
