//! Configuration for the benchmark client.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Default API base URL, the port the evaluation server listens on.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Benchmark API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the evaluation service (e.g., "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Username used for submissions when none is given on the command line
    #[serde(default)]
    pub username: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API settings
    pub api: ApiConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    api: Option<ApiFileSection>,
}

#[derive(Debug, Deserialize)]
struct ApiFileSection {
    base_url: Option<String>,
    username: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (BENCH_API_URL, BENCH_USERNAME)
    /// 2. Config file (~/.config/answer-bench/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        if let Ok(base_url) = env::var("BENCH_API_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(username) = env::var("BENCH_USERNAME") {
            if !username.trim().is_empty() {
                config.api.username = Some(username);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;

        let file_config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|e| BenchError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(api) = file_config.api {
            if let Some(base_url) = api.base_url {
                config.api.base_url = base_url;
            }
            if let Some(username) = api.username {
                config.api.username = Some(username);
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "answer-bench")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();

        if base.is_empty() {
            return Err(BenchError::Config(
                "API base URL is required. Set BENCH_API_URL environment variable or add to config file.".to_string()
            ));
        }

        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(BenchError::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                base
            )));
        }

        Ok(())
    }

    /// Create a config pointing at an explicit API (useful for testing).
    pub fn with_api(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
        }
    }
}
