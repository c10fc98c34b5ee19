// src/core/scanner/ssl_scanner.rs

use tracing::{debug, error, info, warn};

use crate::core::config::ScanConfig;
use crate::core::models::{Finding, FindingKind, ScanTarget};
use chrono::{DateTime, Utc};
use native_tls::{Protocol, TlsConnector};
use std::fmt;
use std::net::{IpAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::task::spawn_blocking;
use x509_parser::prelude::*;

/// Protocol version the server settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Ssl3,
    Tls10,
    Tls11,
    /// TLS 1.2 or 1.3. The connector cannot tell these apart and neither is weak.
    Tls12OrLater,
}

impl TlsVersion {
    pub fn is_weak(self) -> bool {
        !matches!(self, TlsVersion::Tls12OrLater)
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsVersion::Ssl3 => write!(f, "SSLv3"),
            TlsVersion::Tls10 => write!(f, "TLSv1"),
            TlsVersion::Tls11 => write!(f, "TLSv1.1"),
            TlsVersion::Tls12OrLater => write!(f, "TLSv1.2+"),
        }
    }
}

/// Details extracted from the peer certificate.
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub subject_name: String,
    pub issuer_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

/// What a successful TLS session revealed about the endpoint.
#[derive(Debug, Clone)]
pub struct TlsObservation {
    /// `None` when the version could not be established from evidence.
    pub version: Option<TlsVersion>,
    pub certificate: CertificateInfo,
}

/// Why a handshake did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HandshakeFailure {
    /// No TLS conversation took place: resolution, connect, timeout.
    Transport(String),
    /// The TLS layer failed or the server refused the offered protocols.
    Tls(String),
}

impl fmt::Display for HandshakeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeFailure::Transport(message) | HandshakeFailure::Tls(message) => f.write_str(message),
        }
    }
}

/// Client-side protocol bounds for one handshake.
#[derive(Debug, Clone, Copy)]
struct ProtocolRange {
    min: Option<Protocol>,
    max: Option<Protocol>,
}

impl ProtocolRange {
    /// The connector's own defaults.
    const STANDARD: Self = Self {
        min: Some(Protocol::Tlsv10),
        max: None,
    };

    fn at_least(protocol: Protocol) -> Self {
        Self {
            min: Some(protocol),
            max: None,
        }
    }

    fn at_most(protocol: Protocol) -> Self {
        Self {
            min: None,
            max: Some(protocol),
        }
    }

    fn exactly(protocol: Protocol) -> Self {
        Self {
            min: Some(protocol),
            max: Some(protocol),
        }
    }
}

pub async fn run_ssl_scan(target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
    let hostname = target.hostname();
    info!(target = hostname, port = config.tls_port, "Starting SSL/TLS scan.");

    let observation = observe_tls(hostname, config.tls_port, config.tls_timeout()).await;

    debug!("SSL scan finished, starting analysis.");
    let findings = analyze_ssl_results(&observation, Utc::now());

    info!(findings = %findings.len(), "SSL/TLS scan finished.");
    findings
}

async fn observe_tls(host: &str, port: u16, timeout: Duration) -> Result<TlsObservation, String> {
    let cert_der = blocking_handshake(host, port, timeout, ProtocolRange::STANDARD)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| {
            debug!("TLS connection successful, but no peer certificate provided.");
            "Server did not provide a certificate".to_string()
        })?;
    let certificate = parse_certificate(&cert_der)?;

    // All follow-up handshakes share a single deadline.
    let version = match tokio::time::timeout(timeout, detect_protocol_version(host, port, timeout)).await {
        Ok(version) => version,
        Err(_) => {
            warn!(target = host, "TLS version detection ran out of time, version unknown.");
            None
        }
    };
    Ok(TlsObservation { version, certificate })
}

/// Establishes the negotiated version from positive evidence only.
///
/// Completing a handshake with a TLS 1.2 floor proves a strong version. A
/// weak version needs two things: that floor refused at the TLS layer, and a
/// handshake capped at TLS 1.1 that completes. A modern server never accepts
/// the capped handshake, so resets, rate limits and flaps end as `None`.
async fn detect_protocol_version(host: &str, port: u16, timeout: Duration) -> Option<TlsVersion> {
    match blocking_handshake(host, port, timeout, ProtocolRange::at_least(Protocol::Tlsv12)).await {
        Ok(_) => return Some(TlsVersion::Tls12OrLater),
        Err(HandshakeFailure::Transport(e)) => {
            warn!(target = host, error = %e, "Could not reconnect to determine the TLS version.");
            return None;
        }
        Err(HandshakeFailure::Tls(e)) => debug!(error = %e, "Handshake refused with a TLS 1.2 floor."),
    }

    if let Err(e) = blocking_handshake(host, port, timeout, ProtocolRange::at_most(Protocol::Tlsv11)).await {
        warn!(target = host, error = %e, "TLS 1.2 floor refused but no legacy handshake completed, version unknown.");
        return None;
    }

    let legacy = [
        (Protocol::Tlsv11, TlsVersion::Tls11),
        (Protocol::Tlsv10, TlsVersion::Tls10),
        (Protocol::Sslv3, TlsVersion::Ssl3),
    ];
    for (protocol, version) in legacy {
        if blocking_handshake(host, port, timeout, ProtocolRange::exactly(protocol)).await.is_ok() {
            debug!(%version, "Legacy handshake pinned to version.");
            return Some(version);
        }
    }

    warn!(target = host, "Legacy handshake completed but no single version could be pinned.");
    None
}

/// Runs one handshake on the blocking pool, bounded by `timeout`.
/// Returns the peer certificate in DER form, if one was sent.
async fn blocking_handshake(
    host: &str,
    port: u16,
    timeout: Duration,
    range: ProtocolRange,
) -> Result<Option<Vec<u8>>, HandshakeFailure> {
    let host_owned = host.to_string();
    debug!(target = host, port, ?range, "Spawning blocking task for TLS connection.");
    let task = spawn_blocking(move || perform_handshake(&host_owned, port, timeout, range));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!(error = %e, "Blocking TLS handshake task failed!");
            Err(HandshakeFailure::Transport(format!("Handshake task failed: {e}")))
        }
        Err(_) => Err(HandshakeFailure::Transport(format!(
            "TLS handshake timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}

fn perform_handshake(
    host: &str,
    port: u16,
    timeout: Duration,
    range: ProtocolRange,
) -> Result<Option<Vec<u8>>, HandshakeFailure> {
    // Trust is not evaluated: self-signed or expired certificates must still
    // complete the handshake so they can be inspected.
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .use_sni(host.parse::<IpAddr>().is_err())
        .min_protocol_version(range.min)
        .max_protocol_version(range.max)
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to create TlsConnector");
            HandshakeFailure::Tls(format!("TlsConnector Error: {e}"))
        })?;

    let stream = connect_tcp(host, port, timeout).map_err(HandshakeFailure::Transport)?;

    debug!(target = host, "Performing TLS handshake.");
    let stream = connector
        .connect(host, stream)
        .map_err(|e| HandshakeFailure::Tls(format!("TLS Handshake Error: {e}")))?;

    match stream.peer_certificate() {
        Ok(Some(cert)) => cert.to_der().map(Some).map_err(|e| {
            error!(error = %e, "Failed to convert certificate to DER format");
            HandshakeFailure::Tls(format!("Could not convert certificate to DER: {e}"))
        }),
        Ok(None) => Ok(None),
        Err(e) => Err(HandshakeFailure::Tls(format!("Could not get peer certificate: {e}"))),
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, String> {
    debug!(target = host, port, "Connecting TCP stream.");
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("DNS resolution failed: {e}"))?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(timeout))
                    .and_then(|_| stream.set_write_timeout(Some(timeout)))
                    .map_err(|e| format!("TCP Socket Error: {e}"))?;
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "TCP connect attempt failed.");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => format!("TCP Connection Error: {e}"),
        None => format!("DNS resolution returned no addresses for {host}"),
    })
}

fn parse_certificate(der: &[u8]) -> Result<CertificateInfo, String> {
    let (_, x509) = parse_x509_certificate(der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate");
        format!("X.509 Parse Error: {e}")
    })?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");

    let validity = x509.validity();
    Ok(CertificateInfo {
        subject_name: x509.subject().to_string(),
        issuer_name: x509.issuer().to_string(),
        not_before: asn1_time_to_chrono_utc(&validity.not_before),
        not_after: asn1_time_to_chrono_utc(&validity.not_after),
    })
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// Turns the outcome of the TLS session into findings.
///
/// A failed session yields exactly one `ssl_error`. Expiry and weak protocol
/// are independent and may both be reported.
pub fn analyze_ssl_results(
    observation: &Result<TlsObservation, String>,
    now: DateTime<Utc>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    match observation {
        Err(e) => {
            debug!(error = %e, "Scan failed, adding ssl_error finding.");
            findings.push(Finding::new(
                FindingKind::SslError,
                format!("SSL/TLS connection error: {e}"),
            ));
        }
        Ok(observed) => {
            let not_after = observed.certificate.not_after;
            if not_after < now {
                debug!(expiry_date = %not_after, "Certificate is expired, adding ssl_expired finding.");
                findings.push(Finding::new(
                    FindingKind::SslExpired,
                    format!("SSL certificate has expired (not valid after {})", not_after.to_rfc3339()),
                ));
            }
            if let Some(version) = observed.version.filter(|v| v.is_weak()) {
                debug!(%version, "Weak protocol negotiated, adding weak_ssl_version finding.");
                findings.push(Finding::new(
                    FindingKind::WeakSslVersion,
                    format!("Weak SSL/TLS version detected: {version}"),
                ));
            }
        }
    }

    findings
}
