use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, ConfigFile};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the row store URL
const ENDPOINT_ENV: &str = "APPS_SCRIPT_URL";

/// Environment variable overriding the local data directory
const DATA_DIR_ENV: &str = "S3_DATA_DIR";

/// Application configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut builder = AppConfig::builder();
        if let Ok(url) = std::env::var(ENDPOINT_ENV) {
            builder = builder.endpoint_url(url);
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            builder = builder.data_dir(dir);
        }
        // A malformed URL in the environment leaves the endpoint unset rather than
        // failing startup; fetches then report `NotConfigured`.
        let app = builder.build().unwrap_or_else(|err| {
            tracing::warn!("ignoring invalid environment configuration: {}", err);
            AppConfig::default()
        });
        Self { app }
    }
}

impl Config {
    /// Create a new configuration from the environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Ok(Self { app })
    }

    /// Parse a TOML configuration document.
    ///
    /// `APPS_SCRIPT_URL` and `S3_DATA_DIR` fill in keys the document leaves unset.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut file = ConfigFile::from_toml_str(source)?;
        if file.endpoint_url.is_none() {
            file.endpoint_url = std::env::var(ENDPOINT_ENV).ok();
        }
        if file.data_dir.is_none() {
            file.data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        }
        Self::with_builder(file.into_builder())
    }

    /// Load a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Row store endpoint, if configured
    pub fn endpoint_url(&self) -> Option<&str> {
        self.app.endpoint_url.as_deref()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.app.request_timeout
    }

    pub fn resolve_stale_indices(&self) -> bool {
        self.app.resolve_stale_indices
    }

    pub fn refetch_after_add(&self) -> bool {
        self.app.refetch_after_add
    }

    /// Directory holding local data
    pub fn data_dir(&self) -> PathBuf {
        self.app.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
            path.push("s3tracker");
            path
        })
    }

    /// Path of the local SQLite database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("local.db")
    }
}
