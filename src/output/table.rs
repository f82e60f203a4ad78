use super::Formatter;
use crate::models::{Certificate, CertificateReport, CertificateStatus};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use tabled::{Table, Tabled, settings::Style};

const TITLE: &str = "SSL Certificate Expiration Report";

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Days Left")]
    days_left: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Issuer")]
    issuer: String,
}

/// Human readable box table followed by a summary line
#[derive(Debug, Clone)]
pub struct TableFormatter {
    use_colors: bool,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    #[must_use]
    pub const fn new() -> Self {
        Self { use_colors: true }
    }

    #[must_use]
    pub const fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn status(&self, status: CertificateStatus) -> String {
        let label = match status {
            CertificateStatus::Ok => "✓ OK",
            CertificateStatus::Warning => "⚠ WARN",
            CertificateStatus::Expired => "✗ EXPIRED",
            CertificateStatus::Error => "✗ ERROR",
        };
        if !self.use_colors {
            return label.to_string();
        }
        match status {
            CertificateStatus::Ok => label.green().to_string(),
            CertificateStatus::Warning => label.yellow().to_string(),
            CertificateStatus::Expired | CertificateStatus::Error => label.red().to_string(),
        }
    }

    fn row(&self, cert: &Certificate) -> Row {
        match (&cert.error, cert.expires_at) {
            (None, Some(expires_at)) => Row {
                domain: cert.domain.clone(),
                status: self.status(cert.status),
                days_left: cert.days_left.to_string(),
                expires: expires_at.format("%Y-%m-%d").to_string(),
                issuer: cert.issuer.clone(),
            },
            (error, _) => Row {
                domain: cert.domain.clone(),
                status: self.status(cert.status),
                days_left: "N/A".to_string(),
                expires: "N/A".to_string(),
                issuer: error.clone().unwrap_or_default(),
            },
        }
    }
}

impl Formatter for TableFormatter {
    fn format(&self, report: &CertificateReport, out: &mut dyn Write) -> Result<()> {
        let rows: Vec<Row> = report.certificates.iter().map(|c| self.row(c)).collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());

        let title = if self.use_colors {
            TITLE.bold().to_string()
        } else {
            TITLE.to_string()
        };

        writeln!(out, "\n{title}\n")?;
        writeln!(out, "{table}")?;
        writeln!(
            out,
            "\nTotal: {} | Expired: {} | Warning: {} | OK: {} | Error: {}",
            report.total_domains,
            report.summary.expired,
            report.summary.warning,
            report.summary.ok,
            report.summary.error
        )?;
        Ok(())
    }
}
