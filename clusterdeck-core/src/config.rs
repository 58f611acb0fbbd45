//! Configuration loading with TOML files and environment overrides
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! endpoint = "http://127.0.0.1:8000/api/v1"
//! token = "eyJhbGciOi..."
//! connect_timeout = "5s"
//!
//! [logging]
//! level = "debug"
//! file = "/tmp/clusterdeck.log"
//!
//! [ui]
//! tag_max_len = 3
//! tick_rate = "250ms"
//!
//! [form]
//! kubeconfig_check = "yaml"
//! ```

use crate::error::{ClusterDeckError, ClusterDeckResult};
use crate::form::KubeconfigCheck;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
    pub form: FormConfig,
}

/// Where the cluster service lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the version prefix
    pub endpoint: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Limit on establishing a connection. Requests themselves wait for as
    /// long as the server takes.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,

    /// Log destination; the interactive dashboard discards logs without one
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Label tags shown per cluster row before collapsing into "+N"
    pub tag_max_len: usize,

    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Check applied to loaded kubeconfig content, `server` or `yaml`
    pub kubeconfig_check: KubeconfigCheck,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/v1".to_string(),
            token: None,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tag_max_len: 3,
            tick_rate: Duration::from_millis(250),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, apply env overrides and validate
    pub async fn from_file<P: AsRef<Path>>(path: P) -> ClusterDeckResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ClusterDeckError::configuration(
                "config_file",
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus env overrides, for running without a config file
    pub fn from_env() -> ClusterDeckResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ClusterDeckResult<Self> {
        toml::from_str(content).map_err(|e| {
            ClusterDeckError::configuration("toml_parser", format!("Failed to parse TOML: {}", e))
        })
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("CLUSTERDECK_API_ENDPOINT") {
            self.api.endpoint = endpoint;
        }
        if let Ok(token) = std::env::var("CLUSTERDECK_API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Ok(level) = std::env::var("CLUSTERDECK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(file) = std::env::var("CLUSTERDECK_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        if let Ok(check) = std::env::var("CLUSTERDECK_KUBECONFIG_CHECK") {
            match check.parse() {
                Ok(check) => self.form.kubeconfig_check = check,
                Err(e) => tracing::warn!("Ignoring CLUSTERDECK_KUBECONFIG_CHECK: {}", e),
            }
        }
    }

    pub fn validate(&self) -> ClusterDeckResult<()> {
        let endpoint = url::Url::parse(&self.api.endpoint).map_err(|e| {
            ClusterDeckError::configuration(
                "api.endpoint",
                format!("Invalid URL '{}': {}", self.api.endpoint, e),
            )
        })?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ClusterDeckError::configuration(
                    "api.endpoint",
                    format!("Unsupported scheme '{}'", other),
                ))
            }
        }

        if self.api.token.as_deref() == Some("") {
            return Err(ClusterDeckError::configuration(
                "api.token",
                "Token must not be empty when set",
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ClusterDeckError::configuration(
                    "logging.level",
                    format!("Invalid log level: {}", self.logging.level),
                ))
            }
        }

        if self.ui.tag_max_len == 0 {
            return Err(ClusterDeckError::configuration(
                "ui.tag_max_len",
                "Must be greater than 0",
            ));
        }
        if self.ui.tick_rate.is_zero() {
            return Err(ClusterDeckError::configuration(
                "ui.tick_rate",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
