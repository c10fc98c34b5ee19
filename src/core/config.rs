// src/core/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Ports tried by the open-port probe when nothing else is configured.
pub const DEFAULT_PORTS: &[u16] = &[80, 443, 8080, 8443];

/// Paths requested by the disclosure probe when nothing else is configured.
pub const DEFAULT_PATHS: &[&str] = &["/robots.txt", "/.git/", "/.env", "/backup/", "/phpinfo.php"];

/// How the disclosure probe treats `403 Forbidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenPolicy {
    /// A 403 is treated like a 404: the resource is considered absent.
    #[default]
    Ignore,
    /// A 403 is reported, since the server confirms the resource exists.
    Report,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for one scan. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Candidate ports for the TCP connect probe.
    pub ports: Vec<u16>,
    /// Candidate paths for the disclosure probe, each starting with `/`.
    pub paths: Vec<String>,
    /// Port the TLS probe connects to.
    pub tls_port: u16,
    pub tls_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub port_timeout_ms: u64,
    /// Budget for the whole battery of probes.
    pub scan_timeout_secs: u64,
    /// Upper bound on in-flight sub-probes (ports, paths) per probe.
    pub max_concurrency: usize,
    pub user_agent: String,
    pub forbidden_policy: ForbiddenPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            paths: DEFAULT_PATHS.iter().map(|p| p.to_string()).collect(),
            tls_port: 443,
            tls_timeout_secs: 8,
            http_timeout_secs: 10,
            port_timeout_ms: 1000,
            scan_timeout_secs: 60,
            max_concurrency: 8,
            user_agent: format!("VanguardRecon/{}", env!("CARGO_PKG_VERSION")),
            forbidden_policy: ForbiddenPolicy::Ignore,
        }
    }
}

impl ScanConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the
    /// platform config directory is used when present, and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    info!("No configuration file found, using defaults.");
                    return Ok(Self::default());
                }
            },
        };

        let contents = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: config_path.clone(),
                source,
            },
            other => other,
        })?;

        info!(path = %config_path.display(), "Loaded configuration.");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        let timeouts = [
            ("tls_timeout_secs", self.tls_timeout_secs),
            ("http_timeout_secs", self.http_timeout_secs),
            ("port_timeout_ms", self.port_timeout_ms),
            ("scan_timeout_secs", self.scan_timeout_secs),
        ];
        if let Some((field, _)) = timeouts.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid {
                field,
                reason: "must be greater than zero".to_string(),
            });
        }
        // The TLS probe spends one timeout on the certificate handshake and
        // one shared timeout on version detection.
        let tls_worst_case = self.tls_timeout_secs.saturating_mul(2);
        if self.scan_timeout_secs <= tls_worst_case.max(self.http_timeout_secs) {
            return Err(ConfigError::Invalid {
                field: "scan_timeout_secs",
                reason: format!(
                    "must exceed twice tls_timeout_secs ({tls_worst_case}s) and http_timeout_secs ({}s)",
                    self.http_timeout_secs
                ),
            });
        }
        if let Some(path) = self.paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "paths",
                reason: format!("'{path}' must start with '/'"),
            });
        }
        Ok(())
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

fn default_config_path() -> Option<PathBuf> {
    crate::logging::project_directory().map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_candidate_lists() {
        let config = ScanConfig::default();
        assert_eq!(config.ports, vec![80, 443, 8080, 8443]);
        assert_eq!(
            config.paths,
            vec!["/robots.txt", "/.git/", "/.env", "/backup/", "/phpinfo.php"]
        );
        assert_eq!(config.tls_port, 443);
        assert_eq!(config.forbidden_policy, ForbiddenPolicy::Ignore);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ScanConfig::from_toml_str(
            r#"
            ports = [22, 443]
            forbidden_policy = "report"
            "#,
        )
        .unwrap();
        assert_eq!(config.ports, vec![22, 443]);
        assert_eq!(config.forbidden_policy, ForbiddenPolicy::Report);
        assert_eq!(config.paths, ScanConfig::default().paths);
        assert_eq!(config.port_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = ScanConfig::from_toml_str("max_concurrency = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_concurrency", .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ScanConfig::from_toml_str("scan_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "scan_timeout_secs", .. }));
    }

    #[test]
    fn scan_budget_must_outlast_tls_handshakes() {
        let err = ScanConfig::from_toml_str("tls_timeout_secs = 30").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "scan_timeout_secs", .. }));

        let err = ScanConfig::from_toml_str("http_timeout_secs = 60").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "scan_timeout_secs", .. }));

        let config = ScanConfig::from_toml_str("tls_timeout_secs = 20").unwrap();
        assert_eq!(config.tls_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn relative_path_is_rejected() {
        let err = ScanConfig::from_toml_str(r#"paths = ["robots.txt"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "paths", .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ScanConfig::from_toml_str("ports = [80,").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let err = ScanConfig::load(Some(Path::new("/nonexistent/vanguard-recon.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
