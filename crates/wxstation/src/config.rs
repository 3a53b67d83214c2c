use serde::{Deserialize, Serialize};
use std::path::Path;

/// Exporter configuration.
///
/// Loaded from a YAML file when one is given, otherwise defaults.
/// Individual fields can be overridden from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// NWS station identifier to poll (e.g. `KBOS`).
    pub station: String,
    /// Base URL of the weather API.
    pub api_base: String,
    /// Listen address for the exposition endpoint.
    pub listen: String,
    /// Seconds between upstream refreshes.
    pub refresh_interval_secs: u64,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Contact-identifying User-Agent. api.weather.gov rejects
    /// requests without one.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station: "KBOS".to_string(),
            api_base: "https://api.weather.gov".to_string(),
            listen: "0.0.0.0:5000".to_string(),
            refresh_interval_secs: 300,
            request_timeout_secs: 10,
            user_agent: concat!(
                "wxstation/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/wxstation/wxstation)"
            )
            .to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the exporter relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.station.trim().is_empty() {
            return Err(ConfigError::Invalid("station must not be empty".into()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// URL of the latest-observation endpoint for the configured station.
    pub fn observation_url(&self) -> String {
        format!(
            "{}/stations/{}/observations/latest",
            self.api_base.trim_end_matches('/'),
            self.station
        )
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
