//! Application configuration module
//!
//! Provides configuration types for the tracker: where the row store lives,
//! where local data is kept, and the sync-core switches.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Row store endpoint (the spreadsheet web app URL)
    pub endpoint_url: Option<String>,
    /// Directory holding the local database
    pub data_dir: Option<PathBuf>,
    /// Per-request timeout; `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,
    /// Re-resolve queued row indices against a fresh snapshot while draining
    pub resolve_stale_indices: bool,
    /// Refetch the snapshot after an online add succeeds
    pub refetch_after_add: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            data_dir: None,
            request_timeout: None,
            resolve_stale_indices: true,
            refetch_after_add: true,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.endpoint_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::MissingValue("request_timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    endpoint_url: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout: Option<Duration>,
    resolve_stale_indices: Option<bool>,
    refetch_after_add: Option<bool>,
}

impl AppConfigBuilder {
    /// Set the row store endpoint
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.endpoint_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }

    /// Set the local data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn resolve_stale_indices(mut self, enabled: bool) -> Self {
        self.resolve_stale_indices = Some(enabled);
        self
    }

    pub fn refetch_after_add(mut self, enabled: bool) -> Self {
        self.refetch_after_add = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            endpoint_url: self.endpoint_url,
            data_dir: self.data_dir,
            request_timeout: self.request_timeout,
            resolve_stale_indices: self
                .resolve_stale_indices
                .unwrap_or(defaults.resolve_stale_indices),
            refetch_after_add: self.refetch_after_add.unwrap_or(defaults.refetch_after_add),
        };
        config.validate()?;
        Ok(config)
    }
}

/// On-disk shape of a configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub endpoint_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub resolve_stale_indices: Option<bool>,
    pub refetch_after_add: Option<bool>,
}

impl ConfigFile {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Fold the file's values into a builder
    pub fn into_builder(self) -> AppConfigBuilder {
        let mut builder = AppConfig::builder();
        if let Some(url) = self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        if let Some(dir) = self.data_dir {
            builder = builder.data_dir(dir);
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(enabled) = self.resolve_stale_indices {
            builder = builder.resolve_stale_indices(enabled);
        }
        if let Some(enabled) = self.refetch_after_add {
            builder = builder.refetch_after_add(enabled);
        }
        builder
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
