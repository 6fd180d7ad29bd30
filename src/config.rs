//! Service configuration
//!
//! Loaded from an optional JSON file. Every key has a default, so an empty
//! object (or no file at all) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Record store settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file mirroring the collection; `None` keeps it in memory only
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

/// Search settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Escape search text instead of compiling it as a regular expression
    #[serde(default)]
    pub literal_text: bool,
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookshelfConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub search: SearchConfig,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BookshelfConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            store: StoreConfig::default(),
            search: SearchConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl BookshelfConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON document
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: BookshelfConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be > 0".into(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level must not be empty".into()));
        }
        Ok(())
    }
}
