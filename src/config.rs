use crate::{checker::ProbeConfig, output::OutputFormat};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{
    fmt::{self, Write as _},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Basename searched for when no `--config` is given
pub const CONFIG_FILE: &str = "sslcheckdomain.yaml";

/// Optional dotenv file merged into the environment before flags are read
pub const ENV_FILE: &str = ".env";

/// Keys older config files carry for credentials this tool does not use
const IGNORED_KEYS: [&str; 5] = [
    "cloudflare_email",
    "cloudflare_account_id",
    "aws_access_key_id",
    "aws_secret_access_key",
    "aws_region",
];

pub const PROVIDERS: [&str; 3] = ["cloudflare", "file", "route53"];

/// Effective settings for one run
///
/// Built from defaults, then an optional YAML file, then environment
/// variables and flags.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub provider: String,
    pub zone: Option<String>,
    /// Only report certificates with at most this many days left, 0 reports all
    pub expiring_in: i64,
    pub threshold: i64,
    pub output: String,
    pub concurrent: i64,
    /// Seconds
    pub timeout: i64,
    pub port: u16,
    pub cloudflare_token: Option<String>,
    pub domains_file: Option<PathBuf>,
    pub domains: Vec<String>,
    #[serde(skip)]
    pub verbose: u8,
    #[serde(skip)]
    pub test_domain: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "cloudflare".to_string(),
            zone: None,
            expiring_in: 0,
            threshold: 30,
            output: "table".to_string(),
            concurrent: 10,
            timeout: 10,
            port: crate::checker::DEFAULT_PORT,
            cloudflare_token: None,
            domains_file: None,
            domains: Vec::new(),
            verbose: 0,
            test_domain: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("zone", &self.zone)
            .field("expiring_in", &self.expiring_in)
            .field("threshold", &self.threshold)
            .field("output", &self.output)
            .field("concurrent", &self.concurrent)
            .field("timeout", &self.timeout)
            .field("port", &self.port)
            .field("cloudflare_token", &self.cloudflare_token.as_ref().map(|_| "********"))
            .field("domains_file", &self.domains_file)
            .field("domains", &self.domains)
            .field("verbose", &self.verbose)
            .field("test_domain", &self.test_domain)
            .finish()
    }
}

impl Config {
    /// Defaults merged with the YAML file at `path`, or with the first file
    /// found in the search path when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` does not exist or a config file
    /// cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match search_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        debug!(path = %path.display(), "loading config file");

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("error reading config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("error reading config file {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if `contents` is not a valid config document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        if let Some(mapping) = value.as_mapping_mut() {
            for key in IGNORED_KEYS {
                if mapping.remove(key).is_some() {
                    warn!(key, "ignoring unsupported config key");
                }
            }
        }

        Ok(serde_yaml::from_value(value)?)
    }

    /// Whether domains come from the invocation instead of a provider
    #[must_use]
    pub fn has_explicit_domains(&self) -> bool {
        self.test_domain.is_some() || !self.domains.is_empty()
    }

    /// Check every setting before any network activity
    ///
    /// Provider settings are skipped when domains are given explicitly.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<()> {
        if !self.has_explicit_domains() {
            self.validate_provider()?;
        }
        self.probe_config()?;
        self.output_format()?;
        Ok(())
    }

    fn validate_provider(&self) -> Result<()> {
        match self.provider.as_str() {
            "cloudflare" => {
                if self
                    .cloudflare_token
                    .as_deref()
                    .is_none_or(|token| token.trim().is_empty())
                {
                    bail!("CLOUDFLARE_API_TOKEN is required for cloudflare provider");
                }
            }
            "file" => {
                if self.domains_file.is_none() {
                    bail!("a domains file is required for file provider (--domains-file)");
                }
            }
            "route53" => {}
            other => bail!(
                "unsupported provider: {other} (supported: {})",
                PROVIDERS.join(", ")
            ),
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if timeout, concurrency, threshold or port are out of range
    pub fn probe_config(&self) -> Result<ProbeConfig> {
        ProbeConfig::new(self.timeout, self.concurrent, self.threshold, self.port)
    }

    /// # Errors
    ///
    /// Returns an error if the output format is unknown
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.output.parse()
    }

    /// Human readable settings, token redacted
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::from("Configuration loaded:\n");
        let _ = writeln!(out, "  Provider: {}", self.provider);
        if let Some(zone) = &self.zone {
            let _ = writeln!(out, "  Zone: {zone}");
        }
        if self.cloudflare_token.is_some() {
            let _ = writeln!(out, "  Cloudflare token: ********");
        }
        if let Some(file) = &self.domains_file {
            let _ = writeln!(out, "  Domains file: {}", file.display());
        }
        let _ = writeln!(out, "  Timeout: {}s", self.timeout);
        let _ = writeln!(out, "  Concurrent: {}", self.concurrent);
        let _ = writeln!(out, "  Threshold: {} days", self.threshold);
        if self.expiring_in > 0 {
            let _ = writeln!(out, "  Expiring in: {} days", self.expiring_in);
        }
        let _ = writeln!(out, "  Port: {}", self.port);
        let _ = writeln!(out, "  Output: {}", self.output);
        out
    }
}

/// Merge a dotenv file into the process environment
///
/// Variables already set are kept. Returns `false` when there is no file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "loaded environment file");
            Ok(true)
        }
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(err).with_context(|| format!("error reading {}", path.display())),
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        paths.push(home.join(".config").join(CONFIG_FILE));
        paths.push(home.join(CONFIG_FILE));
    }
    paths
}
