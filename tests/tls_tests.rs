// tests/tls_tests.rs
//
// TLS checks against a local native-tls listener.

use std::net::{Shutdown, TcpListener};
use std::thread;

use native_tls::{Identity, TlsAcceptor};

use vanguard_recon::core::scanner::ssl_scanner::run_ssl_scan;
use vanguard_recon::{FindingKind, ScanConfig, ScanTarget, Severity};

const VALID_CERT: &[u8] = include_bytes!("fixtures/valid_cert.pem");
const VALID_KEY: &[u8] = include_bytes!("fixtures/valid_key.pem");
const EXPIRED_CERT: &[u8] = include_bytes!("fixtures/expired_cert.pem");
const EXPIRED_KEY: &[u8] = include_bytes!("fixtures/expired_key.pem");

/// Serves TLS on 127.0.0.1 with the given identity. With `only_first`, every
/// connection after the first is accepted and closed before the handshake.
fn spawn_tls_server(cert: &[u8], key: &[u8], only_first: bool) -> u16 {
    let identity = Identity::from_pkcs8(cert, key).unwrap();
    let acceptor = TlsAcceptor::new(identity).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for (index, stream) in listener.incoming().enumerate() {
            let Ok(stream) = stream else { continue };
            if only_first && index > 0 {
                let _ = stream.shutdown(Shutdown::Both);
                continue;
            }
            if let Ok(mut tls) = acceptor.accept(stream) {
                let _ = tls.shutdown();
            }
        }
    });
    port
}

fn config_for(port: u16) -> ScanConfig {
    ScanConfig {
        tls_port: port,
        tls_timeout_secs: 5,
        ..ScanConfig::default()
    }
}

fn local_target() -> ScanTarget {
    ScanTarget::parse("127.0.0.1").unwrap()
}

#[tokio::test]
async fn test_valid_certificate_has_no_findings() {
    let port = spawn_tls_server(VALID_CERT, VALID_KEY, false);
    let findings = run_ssl_scan(&local_target(), &config_for(port)).await;
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[tokio::test]
async fn test_expired_certificate_yields_one_ssl_expired() {
    let port = spawn_tls_server(EXPIRED_CERT, EXPIRED_KEY, false);
    let findings = run_ssl_scan(&local_target(), &config_for(port)).await;

    assert_eq!(findings.len(), 1, "unexpected findings: {findings:?}");
    assert_eq!(findings[0].kind(), FindingKind::SslExpired);
    assert_eq!(findings[0].severity(), Severity::High);
    assert!(findings[0].description().contains("2021-01-01"));
}

#[tokio::test]
async fn test_refused_follow_up_handshakes_are_not_a_weak_version() {
    let port = spawn_tls_server(VALID_CERT, VALID_KEY, true);
    let findings = run_ssl_scan(&local_target(), &config_for(port)).await;

    assert!(
        findings.iter().all(|f| f.kind() != FindingKind::WeakSslVersion),
        "unexpected findings: {findings:?}"
    );
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[tokio::test]
async fn test_expired_certificate_behind_flaky_listener_is_still_reported() {
    let port = spawn_tls_server(EXPIRED_CERT, EXPIRED_KEY, true);
    let findings = run_ssl_scan(&local_target(), &config_for(port)).await;

    let kinds: Vec<FindingKind> = findings.iter().map(|f| f.kind()).collect();
    assert_eq!(kinds, vec![FindingKind::SslExpired]);
}
