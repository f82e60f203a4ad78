//! Concurrent TLS certificate probing
//!
//! # Module Organization
//!
//! - `config` - probe timeout, concurrency, threshold and port
//! - `verifier` - certificate verifier that accepts any peer certificate
//! - `probe` - one handshake against one domain
//! - `engine` - worker pool fanning domains out to probes
//!
//! # Example
//!
//! ```rust,ignore
//! use sslcheckdomain::checker::{Checker, ProbeConfig};
//!
//! let checker = Checker::new(ProbeConfig::default())?;
//! let certificates = checker
//!     .check_domains(&["example.com".to_string(), "example.org".to_string()])
//!     .await?;
//! ```

pub mod config;
pub mod engine;
pub mod probe;
pub mod verifier;

pub use config::{DEFAULT_PORT, ProbeConfig};
pub use engine::Checker;
pub use probe::{Prober, build_connector, parse_leaf};
pub use verifier::AcceptAnyCertificate;
