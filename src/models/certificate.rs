use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Health of a domain's certificate relative to the warning threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Ok,
    Warning,
    Expired,
    Error,
}

impl CertificateStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Expired => "expired",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from the leaf certificate of a handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCertificate {
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub issuer: String,
    pub subject: String,
    pub serial_number: String,
}

/// Outcome of probing one domain
///
/// Records are only built through [`Certificate::from_leaf`] and
/// [`Certificate::failed`], so `error` is set exactly when `status` is
/// [`CertificateStatus::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub domain: String,
    pub status: CertificateStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issuer: String,
    pub subject: String,
    pub days_left: i64,
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Certificate {
    /// Build a classified record from a successfully extracted leaf certificate
    #[must_use]
    pub fn from_leaf(
        domain: impl Into<String>,
        leaf: LeafCertificate,
        warning_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let (status, days_left) = classify(None, Some(leaf.expires_at), warning_days, now);
        Self {
            domain: domain.into(),
            status,
            expires_at: Some(leaf.expires_at),
            issued_at: Some(leaf.issued_at),
            issuer: leaf.issuer,
            subject: leaf.subject,
            days_left,
            serial_number: leaf.serial_number,
            error: None,
        }
    }

    /// Build an ERROR record; every certificate field stays empty
    #[must_use]
    pub fn failed(domain: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let (status, days_left) = classify(Some(&error), None, 0, Utc::now());
        Self {
            domain: domain.into(),
            status,
            expires_at: None,
            issued_at: None,
            issuer: String::new(),
            subject: String::new(),
            days_left,
            serial_number: String::new(),
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == CertificateStatus::Ok
    }

    #[must_use]
    pub fn needs_attention(&self) -> bool {
        matches!(
            self.status,
            CertificateStatus::Expired | CertificateStatus::Warning
        )
    }
}

/// Whole days from `now` until `expires_at`, rounded toward negative infinity
///
/// A certificate that expired two hours ago is `-1`, never `0`.
#[must_use]
pub fn days_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Map a probe outcome to its status and days left
///
/// An error (or a missing expiration date) is always `Error` with `0` days.
#[must_use]
pub fn classify(
    error: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    warning_days: u32,
    now: DateTime<Utc>,
) -> (CertificateStatus, i64) {
    let Some(expires_at) = expires_at.filter(|_| error.is_none()) else {
        return (CertificateStatus::Error, 0);
    };

    let days_left = days_until(expires_at, now);
    let status = if days_left < 0 {
        CertificateStatus::Expired
    } else if days_left <= i64::from(warning_days) {
        CertificateStatus::Warning
    } else {
        CertificateStatus::Ok
    };

    (status, days_left)
}
