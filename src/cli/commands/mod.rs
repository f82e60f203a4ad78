use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

/// Pure clap command definitions with zero business logic
///
/// No argument carries a default value: unset flags leave the config file
/// and built-in defaults in charge.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .after_help(
            "Examples:\n  \
            sslcheckdomain example.com www.example.com\n  \
            sslcheckdomain --zone example.com --threshold 14\n  \
            sslcheckdomain --expiring-in 7 --output json\n  \
            sslcheckdomain --provider file --domains-file domains.txt -o prometheus\n\n\
            Exit codes: 0 all ok, 1 warnings, 2 expired, 3 errors",
        )
        .arg(
            Arg::new("domains")
                .help("Domains to check instead of asking the provider")
                .value_name("DOMAIN")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("provider")
                .env("SSL_CHECK_PROVIDER")
                .help("DNS provider used to discover domains: cloudflare, file, route53")
                .long("provider")
                .short('p')
                .value_name("NAME"),
        )
        .arg(
            Arg::new("zone")
                .env("SSL_CHECK_ZONE")
                .help("Only check domains in this zone")
                .long("zone")
                .short('z')
                .value_name("ZONE"),
        )
        .arg(
            Arg::new("expiring-in")
                .env("SSL_CHECK_EXPIRING_IN")
                .help("Only show certificates expiring in N days (0 = show all)")
                .long("expiring-in")
                .short('e')
                .value_name("DAYS")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("threshold")
                .env("SSL_CHECK_THRESHOLD")
                .help("Warning threshold in days [default: 30]")
                .long("threshold")
                .short('t')
                .value_name("DAYS")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("output")
                .env("SSL_CHECK_OUTPUT")
                .help("Output format: table, json, prometheus [default: table]")
                .long("output")
                .short('o')
                .value_name("FORMAT"),
        )
        .arg(
            Arg::new("concurrent")
                .env("SSL_CHECK_CONCURRENT")
                .help("Number of concurrent checks [default: 10]")
                .long("concurrent")
                .short('c')
                .value_name("N")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("timeout")
                .env("SSL_CHECK_TIMEOUT")
                .help("Connect and handshake timeout in seconds [default: 10]")
                .long("timeout")
                .value_name("SECONDS")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("port")
                .env("SSL_CHECK_PORT")
                .help("TLS port probed on every domain [default: 443]")
                .long("port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("verbose")
                .help("Verbose output, repeat for more detail (-v info, -vv debug, -vvv trace)")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("test")
                .help("Check a single domain, skipping the provider")
                .long("test")
                .short('d')
                .value_name("DOMAIN"),
        )
        .arg(
            Arg::new("config")
                .env("SSL_CHECK_CONFIG")
                .help("Path to a YAML config file")
                .long_help(
                    "Path to a YAML config file.\n\n\
                    When not given, the first existing file is used:\n\
                    - ./sslcheckdomain.yaml\n\
                    - $HOME/.config/sslcheckdomain.yaml\n\
                    - $HOME/sslcheckdomain.yaml",
                )
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("cloudflare-token")
                .env("CLOUDFLARE_API_TOKEN")
                .hide_env_values(true)
                .help("Cloudflare API token")
                .long("cloudflare-token")
                .value_name("TOKEN"),
        )
        .arg(
            Arg::new("domains-file")
                .env("SSL_CHECK_DOMAINS_FILE")
                .help("File with one domain per line, used by the file provider")
                .long("domains-file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}
