//! Report renderers
//!
//! Every renderer writes a complete [`CertificateReport`] to any
//! [`std::io::Write`], so the binary targets stdout and tests target a buffer.

pub mod json;
pub mod prometheus;
pub mod table;

use crate::models::CertificateReport;
use anyhow::{Result, anyhow};
use std::{fmt, io::Write, str::FromStr};

pub use self::prometheus::PrometheusFormatter;
pub use json::JsonFormatter;
pub use table::TableFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Prometheus,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Prometheus => "prometheus",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "prometheus" => Ok(Self::Prometheus),
            _ => Err(anyhow!(
                "invalid output format: {s} (valid: table, json, prometheus)"
            )),
        }
    }
}

pub trait Formatter {
    /// Render `report` into `out`
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be encoded or written
    fn format(&self, report: &CertificateReport, out: &mut dyn Write) -> Result<()>;
}

#[must_use]
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Prometheus => Box::new(PrometheusFormatter),
    }
}
