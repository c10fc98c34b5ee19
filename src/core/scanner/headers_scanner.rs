// src/core/scanner/headers_scanner.rs

use tracing::{debug, error, info};

use crate::core::config::ScanConfig;
use crate::core::models::{Finding, FindingKind, ScanTarget};
use crate::core::scanner::build_http_client;
use reqwest::header::HeaderMap;

/// The security headers every response should carry, with the message
/// reported when one is absent.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("Strict-Transport-Security", "Missing HSTS header"),
    ("X-Content-Type-Options", "Missing X-Content-Type-Options header"),
    ("X-Frame-Options", "Missing X-Frame-Options header"),
    ("Content-Security-Policy", "Missing Content Security Policy"),
];

/// Fetches the base URL once and reports each missing security header.
///
/// If no response arrives there is nothing to inspect, so a single
/// `request_error` is reported instead of guessing at headers.
pub async fn run_headers_scan(target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
    info!(target = %target, "Starting headers scan.");

    let client = match build_http_client(config, true) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            return vec![Finding::new(
                FindingKind::RequestError,
                format!("Error checking security headers: failed to build HTTP client: {e}"),
            )];
        }
    };

    let url = target.base_url().as_str();
    match client.get(url).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Received HTTP response for headers scan.");
            let findings = analyze_headers(response.headers());
            info!(findings = %findings.len(), "Headers scan finished.");
            findings
        }
        Err(e) => {
            error!(url = %url, error = %e, "HTTP request failed for headers scan.");
            vec![Finding::new(
                FindingKind::RequestError,
                format!("Error checking security headers: {e}"),
            )]
        }
    }
}

/// Reports one `missing_security_header` per absent header. Header names
/// are matched case-insensitively and values are not inspected.
pub fn analyze_headers(headers: &HeaderMap) -> Vec<Finding> {
    debug!("Analyzing collected header data.");
    SECURITY_HEADERS
        .iter()
        .filter(|(name, _)| {
            let present = headers.contains_key(*name);
            debug!(header_name = name, present, "Checked for header.");
            !present
        })
        .map(|(_, message)| Finding::new(FindingKind::MissingSecurityHeader, *message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn all_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("strict-transport-security", HeaderValue::from_static("max-age=31536000"));
        headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
        headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
        headers.insert("content-security-policy", HeaderValue::from_static("default-src 'self'"));
        headers
    }

    #[test]
    fn all_headers_present_yields_nothing() {
        assert!(analyze_headers(&all_headers()).is_empty());
    }

    #[test]
    fn no_headers_yields_one_finding_per_header() {
        let findings = analyze_headers(&HeaderMap::new());
        assert_eq!(findings.len(), 4);
        assert!(findings.iter().all(|f| f.kind() == FindingKind::MissingSecurityHeader));

        let descriptions: Vec<&str> = findings.iter().map(Finding::description).collect();
        assert_eq!(
            descriptions,
            vec![
                "Missing HSTS header",
                "Missing X-Content-Type-Options header",
                "Missing X-Frame-Options header",
                "Missing Content Security Policy",
            ]
        );
    }

    #[test]
    fn only_absent_header_is_reported() {
        let mut headers = all_headers();
        headers.remove("x-frame-options");
        let findings = analyze_headers(&headers);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].description(), "Missing X-Frame-Options header");
    }

    #[test]
    fn permissive_values_are_not_flagged() {
        let mut headers = all_headers();
        headers.insert("content-security-policy", HeaderValue::from_static("default-src *"));
        headers.insert("strict-transport-security", HeaderValue::from_static("max-age=0"));
        assert!(analyze_headers(&headers).is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_yields_single_request_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let target = ScanTarget::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        let config = ScanConfig {
            http_timeout_secs: 2,
            ..ScanConfig::default()
        };

        let findings = run_headers_scan(&target, &config).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind(), FindingKind::RequestError);
        assert!(findings[0].description().starts_with("Error checking security headers"));
    }
}
