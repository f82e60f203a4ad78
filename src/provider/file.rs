use super::{DnsProvider, in_zone};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Reads domains from a local file, one per line
///
/// Blank lines and `#` comments are skipped; CSV lines contribute their first column.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read(&self) -> Result<Vec<String>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read domains file {}", self.path.display()))?;

        let domains = parse_domains(&contents);
        debug!(path = %self.path.display(), domains = domains.len(), "loaded domains file");
        Ok(domains)
    }
}

fn parse_domains(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(',').next())
        .map(|domain| domain.trim().trim_matches('"'))
        .filter(|domain| !domain.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl DnsProvider for FileProvider {
    async fn list_domains(&self) -> Result<Vec<String>> {
        self.read().await
    }

    async fn list_domains_in_zone(&self, zone: &str) -> Result<Vec<String>> {
        Ok(self
            .read()
            .await?
            .into_iter()
            .filter(|domain| in_zone(domain, zone))
            .collect())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
