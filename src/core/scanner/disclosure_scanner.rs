// src/core/scanner/disclosure_scanner.rs

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::core::config::{ForbiddenPolicy, ScanConfig};
use crate::core::models::{Finding, FindingKind, ScanTarget};
use crate::core::scanner::build_http_client;

/// Requests each candidate path with redirects disabled and reports the ones
/// served directly.
///
/// Only a response is evidence: failed requests are skipped, not reported.
pub async fn run_disclosure_scan(target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
    info!(target = %target, paths = config.paths.len(), "Starting information disclosure scan.");

    let client = match build_http_client(config, false) {
        Ok(c) => c,
        Err(e) => {
            // Nothing can be requested, which is the same as no evidence.
            error!(error = %e, "Failed to build HTTP client for disclosure scan.");
            return Vec::new();
        }
    };

    let base_url = target.base_url();
    let policy = config.forbidden_policy;
    let client = &client;
    let findings: Vec<Finding> = stream::iter(config.paths.iter().cloned())
        .map(|path| async move { check_path(client, base_url, &path, policy).await })
        .buffered(config.max_concurrency.max(1))
        .filter_map(|finding| async move { finding })
        .collect()
        .await;

    info!(findings = %findings.len(), "Information disclosure scan finished.");
    findings
}

async fn check_path(client: &Client, base_url: &Url, path: &str, policy: ForbiddenPolicy) -> Option<Finding> {
    let url = match base_url.join(path) {
        Ok(url) => url,
        Err(e) => {
            warn!(path, error = %e, "Could not build URL for path, skipping.");
            return None;
        }
    };

    match client.get(url.clone()).send().await {
        Ok(response) => {
            let status = response.status();
            debug!(%url, %status, "Received response for path.");
            classify_status(status, path, policy)
        }
        Err(e) => {
            debug!(%url, error = %e, "Request for path failed, skipping.");
            None
        }
    }
}

/// Decides whether a status code for `path` is evidence of exposure.
///
/// Only `200 OK` counts by default. Redirects mean the resource as requested
/// does not exist. `403 Forbidden` counts only under `ForbiddenPolicy::Report`.
pub fn classify_status(status: StatusCode, path: &str, policy: ForbiddenPolicy) -> Option<Finding> {
    match status {
        StatusCode::OK => Some(Finding::new(
            FindingKind::InformationDisclosure,
            format!("Potentially sensitive file/directory found: {path}"),
        )),
        StatusCode::FORBIDDEN if policy == ForbiddenPolicy::Report => Some(Finding::new(
            FindingKind::InformationDisclosure,
            format!("Access-restricted file/directory exists (HTTP 403): {path}"),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    #[test]
    fn ok_names_the_path() {
        let finding = classify_status(StatusCode::OK, "/.env", ForbiddenPolicy::Ignore).unwrap();
        assert_eq!(finding.kind(), FindingKind::InformationDisclosure);
        assert_eq!(finding.description(), "Potentially sensitive file/directory found: /.env");
    }

    #[test]
    fn not_found_and_redirects_are_absent() {
        for status in [
            StatusCode::NOT_FOUND,
            StatusCode::MOVED_PERMANENTLY,
            StatusCode::FOUND,
            StatusCode::TEMPORARY_REDIRECT,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::NO_CONTENT,
        ] {
            assert!(classify_status(status, "/.git/", ForbiddenPolicy::Ignore).is_none(), "{status}");
        }
    }

    #[test]
    fn forbidden_depends_on_policy() {
        assert!(classify_status(StatusCode::FORBIDDEN, "/backup/", ForbiddenPolicy::Ignore).is_none());

        let finding = classify_status(StatusCode::FORBIDDEN, "/backup/", ForbiddenPolicy::Report).unwrap();
        assert_eq!(finding.kind(), FindingKind::InformationDisclosure);
        assert!(finding.description().ends_with("/backup/"));
    }

    #[test]
    fn redirect_is_absent_even_when_reporting_forbidden() {
        assert!(classify_status(StatusCode::FOUND, "/.git/", ForbiddenPolicy::Report).is_none());
    }

    fn boxed_scan<'a>(target: &'a ScanTarget, config: &'a ScanConfig) -> BoxFuture<'a, Vec<Finding>> {
        Box::pin(run_disclosure_scan(target, config))
    }

    // Compiles only if the scan future is Send for any borrow of its inputs,
    // which the probe registry needs to box it.
    #[test]
    fn scan_future_is_send() {
        let target = ScanTarget::parse("example.com").unwrap();
        let config = ScanConfig::default();
        drop(boxed_scan(&target, &config));
    }

    #[tokio::test]
    async fn unreachable_host_is_silently_skipped() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let target = ScanTarget::parse(&format!("http://127.0.0.1:{port}/app/")).unwrap();
        let config = ScanConfig {
            http_timeout_secs: 2,
            ..ScanConfig::default()
        };
        assert!(run_disclosure_scan(&target, &config).await.is_empty());
    }
}
