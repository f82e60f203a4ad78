use super::{Certificate, CertificateStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Count of records per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub expired: usize,
    pub warning: usize,
    pub ok: usize,
    pub error: usize,
}

impl ReportSummary {
    fn add(&mut self, status: CertificateStatus) {
        match status {
            CertificateStatus::Expired => self.expired += 1,
            CertificateStatus::Warning => self.warning += 1,
            CertificateStatus::Ok => self.ok += 1,
            CertificateStatus::Error => self.error += 1,
        }
    }
}

/// Everything a renderer needs for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateReport {
    pub timestamp: DateTime<Utc>,
    pub total_domains: usize,
    pub summary: ReportSummary,
    pub certificates: Vec<Certificate>,
}

impl CertificateReport {
    #[must_use]
    pub fn new(certificates: Vec<Certificate>, timestamp: DateTime<Utc>) -> Self {
        let mut summary = ReportSummary::default();
        for cert in &certificates {
            summary.add(cert.status);
        }

        Self {
            timestamp,
            total_domains: certificates.len(),
            summary,
            certificates,
        }
    }

    /// Process exit status for this report
    ///
    /// 2 if anything expired, else 1 on warnings, else 3 on probe errors, else 0.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.summary.expired > 0 {
            2
        } else if self.summary.warning > 0 {
            1
        } else if self.summary.error > 0 {
            3
        } else {
            0
        }
    }
}
