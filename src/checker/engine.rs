use super::{ProbeConfig, probe::Prober};
use crate::models::Certificate;
use anyhow::{Result, bail};
use futures::FutureExt;
use std::{collections::HashMap, panic::AssertUnwindSafe, sync::Arc, time::Instant};
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinSet,
};
use tracing::{debug, error, info, warn};

const CANCELLED: &str = "check cancelled";

/// Bounded worker pool probing many domains concurrently
///
/// Every call returns exactly one record per input domain. Duplicates are
/// probed independently and results come back in completion order.
#[derive(Debug, Clone)]
pub struct Checker {
    prober: Prober,
    concurrency: usize,
}

impl Checker {
    /// # Errors
    ///
    /// Returns an error if the TLS connector cannot be built
    pub fn new(config: ProbeConfig) -> Result<Self> {
        Ok(Self {
            prober: Prober::new(&config)?,
            concurrency: config.concurrency.max(1),
        })
    }

    /// Probe a single domain
    pub async fn check_domain(&self, domain: &str) -> Certificate {
        self.prober.probe(domain).await
    }

    /// Probe every domain in `domains`
    ///
    /// # Errors
    ///
    /// Returns an error if `domains` is empty
    pub async fn check_domains(&self, domains: &[String]) -> Result<Vec<Certificate>> {
        // the sender stays alive until the run is over, so nothing is cancelled
        let (_keep, cancel) = watch::channel(false);
        self.check_domains_with_cancel(domains, cancel).await
    }

    /// Probe every domain in `domains` until `cancel` flips to `true`.
    ///
    /// In-flight probes are abandoned on cancellation and queued ones are not
    /// started; both still produce an ERROR record.
    ///
    /// # Errors
    ///
    /// Returns an error if `domains` is empty
    pub async fn check_domains_with_cancel(
        &self,
        domains: &[String],
        cancel: watch::Receiver<bool>,
    ) -> Result<Vec<Certificate>> {
        if domains.is_empty() {
            bail!("no domains to check");
        }

        let started = Instant::now();

        // both queues hold every item, so neither side ever waits for room
        let (jobs_tx, jobs_rx) = mpsc::channel::<String>(domains.len());
        let (results_tx, mut results_rx) = mpsc::channel::<Certificate>(domains.len());

        for domain in domains {
            jobs_tx.send(domain.clone()).await?;
        }
        drop(jobs_tx);

        let jobs = Arc::new(Mutex::new(jobs_rx));
        let mut workers = JoinSet::new();
        for id in 1..self.concurrency {
            workers.spawn(worker(
                id,
                self.prober.clone(),
                Arc::clone(&jobs),
                results_tx.clone(),
                cancel.clone(),
            ));
        }
        workers.spawn(worker(0, self.prober.clone(), jobs, results_tx, cancel));

        let mut certificates = Vec::with_capacity(domains.len());
        while let Some(cert) = results_rx.recv().await {
            certificates.push(cert);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "probe worker failed");
            }
        }

        fill_missing(domains, &mut certificates);

        info!(
            domains = domains.len(),
            concurrency = self.concurrency,
            elapsed_ms = started.elapsed().as_millis(),
            "certificate check finished"
        );

        Ok(certificates)
    }
}

async fn worker(
    id: usize,
    prober: Prober,
    jobs: Arc<Mutex<mpsc::Receiver<String>>>,
    results: mpsc::Sender<Certificate>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        let next = {
            let mut queue = jobs.lock().await;
            queue.recv().await
        };
        let Some(domain) = next else {
            break;
        };

        let already_cancelled = *cancel.borrow();
        let cert = if already_cancelled {
            Certificate::failed(domain, CANCELLED)
        } else {
            tokio::select! {
                biased;
                () = cancelled(&mut cancel) => Certificate::failed(domain.clone(), CANCELLED),
                cert = guarded_probe(&prober, &domain) => cert,
            }
        };

        debug!(
            worker = id,
            domain = %cert.domain,
            status = %cert.status,
            days_left = cert.days_left,
            "probe finished"
        );

        if results.send(cert).await.is_err() {
            break;
        }
    }
}

async fn guarded_probe(prober: &Prober, domain: &str) -> Certificate {
    AssertUnwindSafe(prober.probe(domain))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            warn!(domain, "probe panicked");
            Certificate::failed(domain, "probe panicked")
        })
}

/// Resolves once the flag is `true`; pends forever if the sender is gone first
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Add an ERROR record for every input occurrence without a collected record
fn fill_missing(domains: &[String], certificates: &mut Vec<Certificate>) {
    let mut outstanding: HashMap<&str, usize> = HashMap::new();
    for domain in domains {
        *outstanding.entry(domain.as_str()).or_default() += 1;
    }
    for cert in certificates.iter() {
        if let Some(count) = outstanding.get_mut(cert.domain.as_str()) {
            *count = count.saturating_sub(1);
        }
    }

    for (domain, count) in outstanding {
        for _ in 0..count {
            warn!(domain, "no record collected, reporting as error");
            certificates.push(Certificate::failed(domain, "probe did not complete"));
        }
    }
}
