// src/core/scanner/ports_scanner.rs

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::core::config::ScanConfig;
use crate::core::models::{Finding, FindingKind, ScanTarget};

/// TCP-connects to every candidate port and reports the ones that accept.
///
/// Refusals, timeouts and socket errors are expected outcomes and are not
/// reported. Findings follow the order of the configured port list.
pub async fn run_ports_scan(target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
    let hostname = target.hostname();
    info!(target = hostname, ports = ?config.ports, "Starting open port scan.");

    let timeout = config.port_timeout();
    let findings: Vec<Finding> = stream::iter(config.ports.iter().copied())
        .map(|port| probe_port(hostname, port, timeout))
        .buffered(config.max_concurrency.max(1))
        .filter_map(|finding| async move { finding })
        .collect()
        .await;

    info!(open = findings.len(), "Open port scan finished.");
    findings
}

async fn probe_port(host: &str, port: u16, timeout: Duration) -> Option<Finding> {
    debug!(host, port, "Connecting.");
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => {
            debug!(port, "Port is open.");
            Some(Finding::new(FindingKind::OpenPort, format!("Port {port} is open")))
        }
        Ok(Err(e)) => {
            debug!(port, error = %e, "Port is closed or unreachable.");
            None
        }
        Err(_) => {
            debug!(port, "Connect timed out.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn only_listening_port_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let config = ScanConfig {
            ports: vec![closed_port(), open, closed_port(), closed_port()],
            ..ScanConfig::default()
        };

        let target = ScanTarget::parse("127.0.0.1").unwrap();
        let findings = run_ports_scan(&target, &config).await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind(), FindingKind::OpenPort);
        assert_eq!(findings[0].description(), format!("Port {open} is open"));
        drop(listener);
    }

    #[tokio::test]
    async fn findings_follow_candidate_order() {
        let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let a = first.local_addr().unwrap().port();
        let b = second.local_addr().unwrap().port();
        let config = ScanConfig {
            ports: vec![b, a],
            max_concurrency: 2,
            ..ScanConfig::default()
        };

        let target = ScanTarget::parse("127.0.0.1").unwrap();
        let descriptions: Vec<String> = run_ports_scan(&target, &config)
            .await
            .iter()
            .map(|f| f.description().to_string())
            .collect();

        assert_eq!(descriptions, vec![format!("Port {b} is open"), format!("Port {a} is open")]);
    }

    #[tokio::test]
    async fn all_closed_yields_nothing() {
        let config = ScanConfig {
            ports: vec![closed_port(), closed_port()],
            ..ScanConfig::default()
        };
        let target = ScanTarget::parse("127.0.0.1").unwrap();
        assert!(run_ports_scan(&target, &config).await.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_host_is_silently_skipped() {
        let config = ScanConfig {
            ports: vec![80],
            port_timeout_ms: 500,
            ..ScanConfig::default()
        };
        let target = ScanTarget::parse("nonexistent.invalid").unwrap();
        assert!(run_ports_scan(&target, &config).await.is_empty());
    }
}
