use super::DnsProvider;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::{collections::BTreeSet, time::Duration};
use tracing::{debug, warn};

const API_BASE: &str = "https://api.cloudflare.com/client/v4";
const ZONES_PER_PAGE: u32 = 50;
const RECORDS_PER_PAGE: u32 = 100;
const PROBED_RECORD_TYPES: [&str; 3] = ["A", "AAAA", "CNAME"];

/// Cloudflare API v4 envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<Vec<T>>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    page: u32,
    total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct Zone {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    #[serde(rename = "type")]
    record_type: String,
    name: String,
}

/// Discovers domains from the zones and DNS records of a Cloudflare account
#[derive(Debug, Clone)]
pub struct CloudflareProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl CloudflareProvider {
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, API_BASE)
    }

    /// Same as [`CloudflareProvider::new`] against another API endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            bail!("cloudflare API token is required");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create cloudflare client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn list_zones(&self, name: Option<&str>) -> Result<Vec<Zone>> {
        let mut query = Vec::new();
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }
        self.paginate("/zones", &query, ZONES_PER_PAGE)
            .await
            .context("failed to list zones")
    }

    async fn subdomains(&self, zone: &Zone) -> Result<Vec<String>> {
        let records: Vec<DnsRecord> = self
            .paginate(&format!("/zones/{}/dns_records", zone.id), &[], RECORDS_PER_PAGE)
            .await
            .context("failed to list DNS records")?;

        let suffix = format!(".{}", zone.name);
        let names: BTreeSet<String> = records
            .into_iter()
            .filter(|r| PROBED_RECORD_TYPES.contains(&r.record_type.as_str()))
            .filter(|r| r.name != zone.name)
            .filter(|r| r.name.ends_with(&suffix) && !r.name.contains('*'))
            .map(|r| r.name)
            .collect();

        debug!(zone = %zone.name, subdomains = names.len(), "listed zone records");
        Ok(names.into_iter().collect())
    }

    async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        per_page: u32,
    ) -> Result<Vec<T>> {
        let url = format!("{}{path}", self.base_url);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let envelope: Envelope<T> = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .query(query)
                .query(&[("page", page), ("per_page", per_page)])
                .send()
                .await
                .with_context(|| format!("request to {path} failed"))?
                .json()
                .await
                .with_context(|| format!("invalid response from {path}"))?;

            if !envelope.success {
                let messages: Vec<String> = envelope
                    .errors
                    .iter()
                    .map(|e| format!("{} ({})", e.message, e.code))
                    .collect();
                return Err(anyhow!("cloudflare API error: {}", messages.join(", ")));
            }

            items.extend(envelope.result.unwrap_or_default());

            match envelope.result_info {
                Some(info) if info.page < info.total_pages => page = info.page + 1,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_domains(&self) -> Result<Vec<String>> {
        let zones = self.list_zones(None).await?;

        let mut domains = Vec::with_capacity(zones.len());
        for zone in &zones {
            domains.push(zone.name.clone());
            match self.subdomains(zone).await {
                Ok(subdomains) => domains.extend(subdomains),
                Err(err) => warn!(
                    zone = %zone.name,
                    error = %format!("{err:#}"),
                    "skipping zone records"
                ),
            }
        }

        Ok(domains)
    }

    async fn list_domains_in_zone(&self, zone: &str) -> Result<Vec<String>> {
        let zone = self
            .list_zones(Some(zone))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("zone not found: {zone}"))?;

        let mut domains = vec![zone.name.clone()];
        domains.extend(
            self.subdomains(&zone)
                .await
                .context("failed to get subdomains")?,
        );
        Ok(domains)
    }

    fn name(&self) -> &'static str {
        "cloudflare"
    }
}
