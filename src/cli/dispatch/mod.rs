use crate::{cli::actions::Action, config::Config};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;

/// Layer flags and environment variables over the loaded config file
fn apply_matches(config: &mut Config, matches: &ArgMatches) {
    if let Some(provider) = matches.get_one::<String>("provider") {
        config.provider.clone_from(provider);
    }
    if let Some(zone) = matches.get_one::<String>("zone") {
        config.zone = Some(zone.clone());
    }
    if let Some(days) = matches.get_one::<i64>("expiring-in") {
        config.expiring_in = *days;
    }
    if let Some(threshold) = matches.get_one::<i64>("threshold") {
        config.threshold = *threshold;
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output.clone_from(output);
    }
    if let Some(concurrent) = matches.get_one::<i64>("concurrent") {
        config.concurrent = *concurrent;
    }
    if let Some(timeout) = matches.get_one::<i64>("timeout") {
        config.timeout = *timeout;
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(token) = matches.get_one::<String>("cloudflare-token") {
        config.cloudflare_token = Some(token.clone());
    }
    if let Some(path) = matches.get_one::<PathBuf>("domains-file") {
        config.domains_file = Some(path.clone());
    }
    if let Some(domains) = matches.get_many::<String>("domains") {
        config.domains = domains.cloned().collect();
    }

    config.test_domain = matches.get_one::<String>("test").cloned();
    config.verbose = matches.get_count("verbose");
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or the resulting
/// configuration is invalid
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = Config::load(path.map(PathBuf::as_path))
        .context("failed to load configuration")?;

    apply_matches(&mut config, matches);

    config.validate().context("invalid configuration")?;

    Ok(Action::Check { config })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::cli::commands;

    fn config_from(args: &[&str]) -> Config {
        let mut argv = vec!["sslcheckdomain"];
        argv.extend_from_slice(args);
        let matches = commands::new().try_get_matches_from(argv).unwrap();

        let mut config = Config::default();
        apply_matches(&mut config, &matches);
        config
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_override_config() {
        let config = config_from(&[
            "-p",
            "file",
            "--domains-file",
            "domains.txt",
            "-z",
            "example.com",
            "-e",
            "7",
            "-t",
            "14",
            "-o",
            "json",
            "-c",
            "3",
            "--timeout",
            "2",
            "--port",
            "8443",
            "-v",
        ]);

        assert_eq!(config.provider, "file");
        assert_eq!(config.domains_file, Some(PathBuf::from("domains.txt")));
        assert_eq!(config.zone.as_deref(), Some("example.com"));
        assert_eq!(config.expiring_in, 7);
        assert_eq!(config.threshold, 14);
        assert_eq!(config.output, "json");
        assert_eq!(config.concurrent, 3);
        assert_eq!(config.timeout, 2);
        assert_eq!(config.port, 8443);
        assert_eq!(config.verbose, 1);
    }

    #[test]
    fn test_file_values_survive_unset_flags() {
        let matches = commands::new()
            .try_get_matches_from(vec!["sslcheckdomain", "-o", "prometheus"])
            .unwrap();
        let mut config = Config::from_yaml("threshold: 60\noutput: json\n").unwrap();
        apply_matches(&mut config, &matches);

        assert_eq!(config.threshold, 60);
        assert_eq!(config.output, "prometheus");
    }

    #[test]
    fn test_dispatch_explicit_domains() {
        let matches = commands::new()
            .try_get_matches_from(vec!["sslcheckdomain", "example.com", "example.org"])
            .unwrap();

        let Action::Check { config } = dispatch(&matches).unwrap();
        assert_eq!(config.domains, vec!["example.com", "example.org"]);
        assert!(config.test_domain.is_none());
    }

    #[test]
    fn test_dispatch_test_domain() {
        let matches = commands::new()
            .try_get_matches_from(vec!["sslcheckdomain", "-d", "example.com"])
            .unwrap();

        let Action::Check { config } = dispatch(&matches).unwrap();
        assert_eq!(config.test_domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_dispatch_invalid_values() {
        let cases: [(&[&str], &str); 4] = [
            (&["example.com", "--timeout", "0"], "timeout must be greater than 0"),
            (&["example.com", "-c", "0"], "concurrent must be greater than 0"),
            (&["example.com", "-t", "-1"], "threshold must be non-negative"),
            (&["example.com", "-o", "xml"], "invalid output format: xml"),
        ];

        for (args, message) in cases {
            let mut argv = vec!["sslcheckdomain"];
            argv.extend_from_slice(args);
            let matches = commands::new().try_get_matches_from(argv).unwrap();
            let err = dispatch(&matches).unwrap_err();
            assert!(format!("{err:#}").contains(message), "{err:#}");
        }
    }

    #[test]
    fn test_dispatch_missing_config_file() {
        let matches = commands::new()
            .try_get_matches_from(vec![
                "sslcheckdomain",
                "--config",
                "/nonexistent/sslcheckdomain.yaml",
                "example.com",
            ])
            .unwrap();
        let err = dispatch(&matches).unwrap_err();
        assert_eq!(err.to_string(), "failed to load configuration");
    }
}
