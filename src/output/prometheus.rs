use super::Formatter;
use crate::models::{CertificateReport, CertificateStatus};
use anyhow::{Context, Result};
use prometheus::{
    Encoder, IntGauge, IntGaugeVec, Registry, opts, register_int_gauge_vec_with_registry,
    register_int_gauge_with_registry,
};
use std::io::Write;

/// Prometheus text exposition of a report, suitable for the node exporter
/// textfile collector
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusFormatter;

/// Gauge value of `ssl_certificate_status`
#[must_use]
pub const fn status_value(status: CertificateStatus) -> i64 {
    match status {
        CertificateStatus::Expired => 0,
        CertificateStatus::Warning => 1,
        CertificateStatus::Ok => 2,
        CertificateStatus::Error => 3,
    }
}

struct ReportMetrics {
    expiry_days: IntGaugeVec,
    status: IntGaugeVec,
    total: IntGauge,
    expired: IntGauge,
    warning: IntGauge,
    ok: IntGauge,
    error: IntGauge,
}

impl ReportMetrics {
    fn register(registry: &Registry) -> Result<Self> {
        Ok(Self {
            expiry_days: register_int_gauge_vec_with_registry!(
                opts!(
                    "ssl_certificate_expiry_days",
                    "Days until SSL certificate expires"
                ),
                &["domain", "issuer", "status"],
                registry
            )?,
            status: register_int_gauge_vec_with_registry!(
                opts!(
                    "ssl_certificate_status",
                    "SSL certificate status (0=expired, 1=warning, 2=ok, 3=error)"
                ),
                &["domain", "issuer"],
                registry
            )?,
            total: register_int_gauge_with_registry!(
                "ssl_certificates_total",
                "Total number of SSL certificates checked",
                registry
            )?,
            expired: register_int_gauge_with_registry!(
                "ssl_certificates_expired",
                "Number of expired SSL certificates",
                registry
            )?,
            warning: register_int_gauge_with_registry!(
                "ssl_certificates_warning",
                "Number of SSL certificates expiring soon",
                registry
            )?,
            ok: register_int_gauge_with_registry!(
                "ssl_certificates_ok",
                "Number of valid SSL certificates",
                registry
            )?,
            error: register_int_gauge_with_registry!(
                "ssl_certificates_error",
                "Number of SSL certificates that could not be checked",
                registry
            )?,
        })
    }

    fn observe(&self, report: &CertificateReport) -> Result<()> {
        for cert in &report.certificates {
            if cert.status != CertificateStatus::Error {
                self.expiry_days
                    .with_label_values(&[
                        cert.domain.as_str(),
                        cert.issuer.as_str(),
                        cert.status.as_str(),
                    ])
                    .set(cert.days_left);
            }
            self.status
                .with_label_values(&[cert.domain.as_str(), cert.issuer.as_str()])
                .set(status_value(cert.status));
        }

        self.total.set(i64::try_from(report.total_domains)?);
        self.expired.set(i64::try_from(report.summary.expired)?);
        self.warning.set(i64::try_from(report.summary.warning)?);
        self.ok.set(i64::try_from(report.summary.ok)?);
        self.error.set(i64::try_from(report.summary.error)?);
        Ok(())
    }
}

impl Formatter for PrometheusFormatter {
    fn format(&self, report: &CertificateReport, out: &mut dyn Write) -> Result<()> {
        // one registry per report, nothing leaks between runs
        let registry = Registry::new();
        let metrics = ReportMetrics::register(&registry).context("failed to register metrics")?;
        metrics.observe(report)?;

        let mut buffer = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .context("could not encode metrics")?;
        out.write_all(&buffer)?;
        Ok(())
    }
}
