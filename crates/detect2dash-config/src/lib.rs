// detect2dash-config - Runtime configuration for the detection relay
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority, DETECT2DASH_* prefix)
// 2. Config file path from DETECT2DASH_CONFIG env var
// 3. Config file contents from DETECT2DASH_CONFIG_CONTENT env var
// 4. Default config file locations (./config.toml, ./.detect2dash.toml)
// 5. Built-in defaults (lowest priority)
//
// CLI flags are applied on top by the server binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::EnvSource;

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub frontend: FrontendConfig,

    #[serde(default)]
    pub request: RequestConfig,
}

/// Listener and logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

/// In-memory retention of detection batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Most recent batches kept; older ones are evicted.
    pub capacity: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            capacity: detect2dash_core::DEFAULT_CAPACITY.get(),
        }
    }
}

/// Static dashboard bundle and cross-origin access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub static_dir: String,
    pub index: String,
    pub cors_enabled: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_dir: "out".to_string(),
            index: "index.html".to_string(),
            cors_enabled: true,
        }
    }
}

/// Request handling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub max_payload_bytes: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority; a config file that
    /// fails to read or parse is an error.
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load from an explicit file path (CLI `--config`), then apply
    /// environment overrides.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse TOML content; missing sections and fields take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration TOML")
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
