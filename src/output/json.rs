use super::Formatter;
use crate::models::CertificateReport;
use anyhow::{Context, Result};
use std::io::Write;

/// Pretty-printed JSON report
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, report: &CertificateReport, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, report).context("failed to encode JSON report")?;
        writeln!(out)?;
        Ok(())
    }
}
