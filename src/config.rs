//! Exporter configuration.
//!
//! Values come from three layers, lowest precedence first: built-in
//! defaults, an optional TOML file, and command-line flags or their
//! environment variables.

use crate::metrics::MetricsServerConfig;
use crate::poller::PollConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Resolved exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Icecast status endpoint, normally `http://icecast.example.com/status-json.xsl`.
    pub url: String,
    /// Port the metrics server listens on.
    pub port: u16,
    /// Path the metrics are served on.
    pub endpoint: String,
    /// Seconds between status polls.
    pub interval: u64,
    /// Host of the legacy clock push target; empty disables pushing.
    pub clock: String,
    /// Only collect streams with this `server_name`; empty collects all.
    pub filter: String,
    /// Make label values compatible with Prometheus before 3.0.
    pub legacy_label: bool,
    /// Seconds before a status fetch is abandoned.
    pub timeout: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            port: 2112,
            endpoint: "/metrics".to_string(),
            interval: 15,
            clock: String::new(),
            filter: String::new(),
            legacy_label: false,
            timeout: 10,
        }
    }
}

impl ExporterConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let parsed =
            url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        if self.interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    /// Poller settings derived from this configuration.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            status_url: self.url.clone(),
            interval: Duration::from_secs(self.interval),
            server_filter: self.filter.clone(),
            legacy_labels: self.legacy_label,
            request_timeout: Duration::from_secs(self.timeout.max(1)),
        }
    }

    /// Metrics server settings derived from this configuration.
    pub fn server_config(&self) -> MetricsServerConfig {
        MetricsServerConfig::new(self.port, &self.endpoint)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Status URL was not supplied.
    #[error("missing required status URL")]
    MissingUrl,
    /// Status URL is not an absolute http(s) URL.
    #[error("invalid status URL: {0}")]
    InvalidUrl(String),
    /// Poll interval is zero.
    #[error("invalid poll interval (must be at least 1 second)")]
    InvalidInterval,
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Settings under the `[exporter]` table.
    #[serde(default)]
    pub exporter: ExporterConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::default();
        assert_eq!(config.port, 2112);
        assert_eq!(config.endpoint, "/metrics");
        assert_eq!(config.interval, 15);
        assert!(!config.legacy_label);
    }

    #[test]
    fn test_missing_url_invalid() {
        let config = ExporterConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingUrl)));
    }

    #[test]
    fn test_url_validation() {
        let mut config = ExporterConfig {
            url: "icecast.example.com/status-json.xsl".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config.url = "ftp://icecast.example.com/status".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config.url = "http://icecast.example.com/status-json.xsl".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_invalid() {
        let config = ExporterConfig {
            url: "http://icecast.example.com/status-json.xsl".to_string(),
            interval: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval)));
    }

    #[test]
    fn test_file_partial_override() {
        let file = FileConfig::from_toml(
            r#"
            [exporter]
            url = "http://radio.example:8000/status-json.xsl"
            filter = "Main"
            legacy_label = true
            "#,
        )
        .unwrap();

        assert_eq!(file.exporter.filter, "Main");
        assert!(file.exporter.legacy_label);
        assert_eq!(file.exporter.port, 2112);
        assert!(file.exporter.validate().is_ok());
    }

    #[test]
    fn test_file_parse_error() {
        assert!(matches!(
            FileConfig::from_toml("[exporter]\nport = \"nope\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_poll_config_mapping() {
        let config = ExporterConfig {
            url: "http://h/status-json.xsl".to_string(),
            interval: 30,
            filter: "Main".to_string(),
            ..Default::default()
        };
        let poll = config.poll_config();
        assert_eq!(poll.interval, Duration::from_secs(30));
        assert_eq!(poll.server_filter, "Main");
        assert_eq!(poll.request_timeout, Duration::from_secs(10));
    }
}
