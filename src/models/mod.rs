//! Certificate records and the reports built from them
//!
//! - `certificate` - one probe outcome plus the status classifier
//! - `report` - aggregated view handed to the renderers

pub mod certificate;
pub mod report;

pub use certificate::{Certificate, CertificateStatus, LeafCertificate, classify, days_until};
pub use report::{CertificateReport, ReportSummary};
