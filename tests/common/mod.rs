#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SerialNumber};
use rustls::{
    ServerConfig,
    crypto::ring::default_provider,
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
};
use sslcheckdomain::checker::ProbeConfig;
use std::{sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::{io::AsyncReadExt, net::TcpListener, task::JoinHandle};
use tokio_rustls::TlsAcceptor;

pub const SERIAL: [u8; 3] = [0x0a, 0x0b, 0x0c];
pub const SERIAL_DECIMAL: &str = "658188";
pub const ISSUER_CN: &str = "sslcheckdomain test CA";

/// A local TLS endpoint, stopped on drop
pub struct TestServer {
    pub port: u16,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Self-signed certificate valid until `now + valid_for`
pub fn certificate(valid_for: time::Duration) -> (CertificateDer<'static>, PrivateKeyDer<'static>) {
    let now = OffsetDateTime::now_utc();

    let mut params =
        CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, ISSUER_CN);
    params.distinguished_name = dn;
    params.serial_number = Some(SerialNumber::from_slice(&SERIAL));
    params.not_before = now - time::Duration::days(365);
    params.not_after = now + valid_for;

    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();

    (
        cert.der().clone(),
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der())),
    )
}

/// Serve a certificate expiring `valid_for` from now on an ephemeral port
pub async fn tls_server(valid_for: time::Duration) -> TestServer {
    let (cert, key) = certificate(valid_for);
    let config = ServerConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    // hold the session until the client closes it
                    let mut buf = [0u8; 64];
                    let _ = tls.read(&mut buf).await;
                }
            });
        }
    });

    TestServer { port, handle }
}

/// Accepts TCP connections and never answers the TLS handshake
pub async fn hanging_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    TestServer { port, handle }
}

/// A port nothing listens on
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    listener.local_addr().unwrap().port()
}

pub fn probe_config(port: u16) -> ProbeConfig {
    ProbeConfig {
        port,
        timeout: Duration::from_secs(5),
        ..ProbeConfig::default()
    }
}
