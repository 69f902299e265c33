// Configuration source loading.
//
// Priority order:
// 1. Environment variables (DETECT2DASH_* prefix)
// 2. Config file path from DETECT2DASH_CONFIG
// 3. Inline config content from DETECT2DASH_CONFIG_CONTENT
// 4. Default config files (./config.toml, ./.detect2dash.toml)
// 5. Built-in defaults

use crate::env_overrides::{EnvSource, ENV_PREFIX};
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_PATHS: &[&str] = &["./config.toml", "./.detect2dash.toml"];

/// Load configuration using native environment/file access.
pub fn load_config() -> Result<RuntimeConfig> {
    resolve(load_from_file()?, &StdEnvSource)
}

/// Layer environment overrides over the file config (or defaults) and validate.
fn resolve<E: EnvSource>(file: Option<RuntimeConfig>, env: &E) -> Result<RuntimeConfig> {
    let mut config = file.unwrap_or_default();
    config.apply_env_overrides_from(env)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file() -> Result<Option<RuntimeConfig>> {
    if let Ok(path) = env::var(format!("{}CONFIG", ENV_PREFIX)) {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Ok(content) = env::var(format!("{}CONFIG_CONTENT", ENV_PREFIX)) {
        let config: RuntimeConfig = toml::from_str(&content)
            .context("Failed to parse inline config from DETECT2DASH_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for path in DEFAULT_CONFIG_PATHS {
        let path = Path::new(path);
        if path.exists() {
            return read_config_file(path).map(Some);
        }
    }

    debug!("No config file found, using defaults");
    Ok(None)
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    resolve(Some(read_config_file(path.as_ref())?), &StdEnvSource)
}

fn read_config_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: RuntimeConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    debug!("Loaded config file {}", path.display());
    Ok(config)
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}
