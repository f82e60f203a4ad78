#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

mod common;

use common::{ISSUER_CN, SERIAL_DECIMAL, closed_port, hanging_server, probe_config, tls_server};
use sslcheckdomain::{
    checker::{Checker, ProbeConfig, Prober},
    models::CertificateStatus,
};
use std::time::Duration;

#[tokio::test]
async fn test_warning_certificate() {
    let server = tls_server(time::Duration::days(10) + time::Duration::hours(1)).await;
    let prober = Prober::new(&probe_config(server.port)).unwrap();

    let cert = prober.probe("127.0.0.1").await;

    assert_eq!(cert.domain, "127.0.0.1");
    assert_eq!(cert.status, CertificateStatus::Warning, "{cert:?}");
    assert_eq!(cert.days_left, 10);
    assert!(cert.error.is_none());
    assert_eq!(cert.issuer, ISSUER_CN);
    assert_eq!(cert.subject, ISSUER_CN);
    assert_eq!(cert.serial_number, SERIAL_DECIMAL);
    assert!(cert.expires_at.is_some());
    assert!(cert.issued_at < cert.expires_at);
    assert!(cert.needs_attention());
}

#[tokio::test]
async fn test_expired_certificate() {
    let server = tls_server(time::Duration::hours(-47)).await;
    let prober = Prober::new(&probe_config(server.port)).unwrap();

    let cert = prober.probe("127.0.0.1").await;

    assert_eq!(cert.status, CertificateStatus::Expired, "{cert:?}");
    assert_eq!(cert.days_left, -2);
    assert!(cert.error.is_none());
}

#[tokio::test]
async fn test_ok_certificate() {
    let server = tls_server(time::Duration::days(90) + time::Duration::hours(1)).await;
    let prober = Prober::new(&probe_config(server.port)).unwrap();

    let cert = prober.probe("localhost").await;

    assert_eq!(cert.domain, "localhost");
    assert_eq!(cert.status, CertificateStatus::Ok, "{cert:?}");
    assert_eq!(cert.days_left, 90);
    assert!(cert.is_healthy());
}

#[tokio::test]
async fn test_threshold_boundary_is_warning() {
    let server = tls_server(time::Duration::days(30) + time::Duration::hours(1)).await;
    let prober = Prober::new(&probe_config(server.port)).unwrap();

    let cert = prober.probe("127.0.0.1").await;
    assert_eq!(cert.days_left, 30);
    assert_eq!(cert.status, CertificateStatus::Warning);

    let prober = Prober::new(&ProbeConfig {
        warning_days: 29,
        ..probe_config(server.port)
    })
    .unwrap();
    let cert = prober.probe("127.0.0.1").await;
    assert_eq!(cert.status, CertificateStatus::Ok);
}

#[tokio::test]
async fn test_handshake_timeout() {
    let server = hanging_server().await;
    let prober = Prober::new(&ProbeConfig {
        timeout: Duration::from_millis(500),
        ..probe_config(server.port)
    })
    .unwrap();

    let started = std::time::Instant::now();
    let cert = prober.probe("127.0.0.1").await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(cert.status, CertificateStatus::Error);
    let error = cert.error.unwrap();
    assert!(error.starts_with("failed to connect:"), "{error}");
    assert!(error.contains("timed out"), "{error}");
}

#[tokio::test]
async fn test_connection_refused() {
    let prober = Prober::new(&probe_config(closed_port())).unwrap();
    let cert = prober.probe("127.0.0.1").await;

    assert_eq!(cert.status, CertificateStatus::Error);
    assert!(cert.error.unwrap().starts_with("failed to connect:"));
    assert!(cert.expires_at.is_none());
    assert!(cert.serial_number.is_empty());
}

#[tokio::test]
async fn test_unresolvable_domain() {
    let prober = Prober::new(&ProbeConfig {
        timeout: Duration::from_secs(3),
        ..ProbeConfig::default()
    })
    .unwrap();
    let cert = prober.probe("does-not-exist.invalid").await;

    assert_eq!(cert.status, CertificateStatus::Error);
    assert!(cert.error.unwrap().starts_with("failed to connect:"));
}

#[tokio::test]
async fn test_probe_is_repeatable() {
    let server = tls_server(time::Duration::days(45) + time::Duration::hours(1)).await;
    let prober = Prober::new(&probe_config(server.port)).unwrap();

    let first = prober.probe("127.0.0.1").await;
    let second = prober.probe("127.0.0.1").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_check_domain() {
    let server = tls_server(time::Duration::days(5) + time::Duration::hours(1)).await;
    let checker = Checker::new(probe_config(server.port)).unwrap();

    let cert = checker.check_domain("127.0.0.1").await;
    assert_eq!(cert.status, CertificateStatus::Warning);
    assert_eq!(cert.days_left, 5);
}
