//! Domain discovery
//!
//! The probe engine only needs domain strings; where they come from is the
//! provider's concern. Providers are selected by name through [`ProviderFactory`].

pub mod cloudflare;
pub mod file;

use crate::config::Config;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub use cloudflare::CloudflareProvider;
pub use file::FileProvider;

/// A source of domain names to probe
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Every domain the provider knows about
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read
    async fn list_domains(&self) -> Result<Vec<String>>;

    /// Domains belonging to `zone`, including the zone apex
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the zone is unknown
    async fn list_domains_in_zone(&self, zone: &str) -> Result<Vec<String>>;

    fn name(&self) -> &'static str;
}

type Constructor = Box<dyn Fn() -> Result<Box<dyn DnsProvider>> + Send + Sync>;

/// Provider constructors keyed by provider name
#[derive(Default)]
pub struct ProviderFactory {
    constructors: BTreeMap<String, Constructor>,
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("providers", &self.available())
            .finish()
    }
}

impl ProviderFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with every built-in provider wired to `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut factory = Self::new();

        let token = config.cloudflare_token.clone();
        factory.register("cloudflare", move || {
            let token = token.clone().ok_or_else(|| {
                anyhow!("CLOUDFLARE_API_TOKEN is required for cloudflare provider")
            })?;
            Ok(Box::new(CloudflareProvider::new(token)?) as Box<dyn DnsProvider>)
        });

        let path = config.domains_file.clone();
        factory.register("file", move || {
            let path = path
                .clone()
                .ok_or_else(|| anyhow!("a domains file is required for file provider"))?;
            Ok(Box::new(FileProvider::new(path)) as Box<dyn DnsProvider>)
        });

        factory.register("route53", || Err(anyhow!("route53 provider not yet implemented")));

        factory
    }

    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn() -> Result<Box<dyn DnsProvider>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.to_string(), Box::new(constructor));
    }

    /// Build the provider registered under `name`
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is registered under `name` or its
    /// constructor fails
    pub fn create(&self, name: &str) -> Result<Box<dyn DnsProvider>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| anyhow!("unknown provider: {name}"))?;
        constructor()
    }

    /// Registered provider names, sorted
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

/// Whether `domain` is `zone` itself or one of its subdomains
#[must_use]
pub fn in_zone(domain: &str, zone: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let zone = zone.trim_end_matches('.');
    domain.eq_ignore_ascii_case(zone)
        || (domain.len() > zone.len()
            && domain
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", zone.to_ascii_lowercase())))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    struct StaticProvider(Vec<String>);

    #[async_trait]
    impl DnsProvider for StaticProvider {
        async fn list_domains(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }

        async fn list_domains_in_zone(&self, zone: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().filter(|d| in_zone(d, zone)).cloned().collect())
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    #[tokio::test]
    async fn test_register_and_create() {
        let mut factory = ProviderFactory::new();
        factory.register("static", || {
            Ok(Box::new(StaticProvider(vec![
                "example.com".to_string(),
                "www.example.com".to_string(),
                "example.org".to_string(),
            ])) as Box<dyn DnsProvider>)
        });

        let provider = factory.create("static").unwrap();
        assert_eq!(provider.name(), "static");
        assert_eq!(provider.list_domains().await.unwrap().len(), 3);
        assert_eq!(
            provider.list_domains_in_zone("example.com").await.unwrap(),
            vec!["example.com".to_string(), "www.example.com".to_string()]
        );
    }

    #[test]
    fn test_unknown_provider() {
        let factory = ProviderFactory::new();
        let err = factory.create("godaddy").err().unwrap();
        assert_eq!(err.to_string(), "unknown provider: godaddy");
    }

    #[test]
    fn test_from_config_providers() {
        let factory = ProviderFactory::from_config(&Config::default());
        assert_eq!(factory.available(), vec!["cloudflare", "file", "route53"]);

        let err = factory.create("route53").err().unwrap();
        assert!(err.to_string().contains("not yet implemented"));

        let err = factory.create("cloudflare").err().unwrap();
        assert!(err.to_string().contains("CLOUDFLARE_API_TOKEN"));

        let err = factory.create("file").err().unwrap();
        assert!(err.to_string().contains("domains file"));
    }

    #[test]
    fn test_from_config_with_credentials() {
        let config = Config {
            cloudflare_token: Some("token".to_string()),
            domains_file: Some("/tmp/domains.txt".into()),
            ..Config::default()
        };
        let factory = ProviderFactory::from_config(&config);

        assert_eq!(factory.create("cloudflare").unwrap().name(), "cloudflare");
        assert_eq!(factory.create("file").unwrap().name(), "file");
    }

    #[test]
    fn test_in_zone() {
        assert!(in_zone("example.com", "example.com"));
        assert!(in_zone("api.example.com", "example.com"));
        assert!(in_zone("API.Example.com.", "example.com"));
        assert!(!in_zone("badexample.com", "example.com"));
        assert!(!in_zone("example.org", "example.com"));
        assert!(!in_zone("com", "example.com"));
    }

    #[test]
    fn test_factory_debug() {
        let factory = ProviderFactory::from_config(&Config::default());
        let debug_str = format!("{factory:?}");
        assert!(debug_str.contains("route53"));
    }
}
