use super::{ProbeConfig, verifier::AcceptAnyCertificate};
use crate::models::{Certificate, LeafCertificate};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rustls::{
    ClientConfig,
    crypto::ring::default_provider,
    pki_types::ServerName,
    version::{TLS12, TLS13},
};
use std::{net::IpAddr, sync::Arc, time::Duration};
use tokio::{io::AsyncWriteExt, net::TcpStream, time};
use tokio_rustls::{TlsConnector, client::TlsStream};
use tracing::debug;
use x509_parser::prelude::{ASN1Time, FromDer, X509Certificate, X509Name};

/// Build the TLS connector used for every probe.
///
/// TLS 1.2 is the minimum protocol version and certificates are never verified.
///
/// # Errors
///
/// Returns an error if the crypto provider does not support the protocol versions
pub fn build_connector() -> Result<TlsConnector> {
    let config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_protocol_versions(&[&TLS13, &TLS12])
        .context("failed to select TLS protocol versions")?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Performs one TLS handshake per domain and turns the outcome into a record
#[derive(Clone)]
pub struct Prober {
    connector: TlsConnector,
    port: u16,
    timeout: Duration,
    warning_days: u32,
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("warning_days", &self.warning_days)
            .finish_non_exhaustive()
    }
}

impl Prober {
    /// # Errors
    ///
    /// Returns an error if the TLS connector cannot be built
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            connector: build_connector()?,
            port: config.port,
            timeout: config.timeout,
            warning_days: config.warning_days,
        })
    }

    /// Probe `domain` and return its classified record.
    ///
    /// Never fails: connection, timeout and certificate problems become an
    /// ERROR record. Opens exactly one connection, closed before returning.
    pub async fn probe(&self, domain: &str) -> Certificate {
        debug!(domain, port = self.port, "probing certificate");

        let mut stream = match time::timeout(self.timeout, self.establish(domain)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                return Certificate::failed(domain, format!("failed to connect: {err:#}"));
            }
            Err(_) => {
                return Certificate::failed(
                    domain,
                    format!("failed to connect: timed out after {:?}", self.timeout),
                );
            }
        };

        let leaf = leaf_from_stream(&stream);
        self.close(&mut stream).await;

        match leaf {
            Ok(leaf) => Certificate::from_leaf(domain, leaf, self.warning_days, Utc::now()),
            Err(err) => Certificate::failed(domain, format!("{err:#}")),
        }
    }

    async fn establish(&self, domain: &str) -> Result<TlsStream<TcpStream>> {
        let server_name = server_name_from_host(domain)?;

        let stream = TcpStream::connect((domain, self.port))
            .await
            .with_context(|| format!("tcp connect to {domain}:{}", self.port))?;

        self.connector
            .connect(server_name, stream)
            .await
            .context("tls handshake")
    }

    async fn close(&self, stream: &mut TlsStream<TcpStream>) {
        // close_notify is best effort, the socket is dropped either way
        if let Ok(Err(err)) = time::timeout(self.timeout, stream.shutdown()).await {
            debug!(error = %err, "tls shutdown failed");
        }
    }
}

fn server_name_from_host(host: &str) -> Result<ServerName<'static>> {
    host.parse::<IpAddr>().map_or_else(
        |_| {
            ServerName::try_from(host.to_string())
                .map_err(|_| anyhow!("invalid server name: {host}"))
        },
        |ip| Ok(ServerName::from(ip)),
    )
}

fn leaf_from_stream(stream: &TlsStream<TcpStream>) -> Result<LeafCertificate> {
    let (_, connection) = stream.get_ref();
    let leaf = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| anyhow!("no certificate found"))?;

    parse_leaf(leaf.as_ref())
}

/// Extract expiration metadata from a DER-encoded certificate
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed
pub fn parse_leaf(cert_der: &[u8]) -> Result<LeafCertificate> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| anyhow!("failed to parse certificate: {e}"))?;
    let validity = cert.validity();

    Ok(LeafCertificate {
        expires_at: to_utc(&validity.not_after)?,
        issued_at: to_utc(&validity.not_before)?,
        issuer: common_name(cert.issuer()),
        subject: common_name(cert.subject()),
        serial_number: cert.tbs_certificate.serial.to_string(),
    })
}

fn to_utc(time: &ASN1Time) -> Result<DateTime<Utc>> {
    let raw = time.to_datetime();
    DateTime::<Utc>::from_timestamp(raw.unix_timestamp(), raw.nanosecond())
        .ok_or_else(|| anyhow!("invalid certificate timestamp"))
}

fn common_name(name: &X509Name<'_>) -> String {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or_default()
        .to_string()
}
