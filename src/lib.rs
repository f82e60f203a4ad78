//! Check TLS certificate expiration across many domains
//!
//! Domains come from a DNS provider, a file or the command line. Each one is
//! probed with a raw TLS handshake, its leaf certificate is classified against
//! a warning threshold and the results are rendered as a table, JSON or
//! Prometheus metrics.

pub mod checker;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod provider;
pub mod scan;
