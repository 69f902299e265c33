// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_server_config(&config.server)?;
    validate_retention_config(&config.retention)?;
    validate_frontend_config(&config.frontend)?;
    validate_request_config(&config.request)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.listen_addr.is_empty() {
        bail!("server.listen_addr must not be empty");
    }

    // Basic validation that it looks like an address
    if !config.listen_addr.contains(':') {
        bail!("server.listen_addr must be in format 'host:port'");
    }

    Ok(())
}

fn validate_retention_config(config: &RetentionConfig) -> Result<()> {
    if config.capacity == 0 {
        bail!("retention.capacity must be greater than 0");
    }

    if config.capacity > 100_000 {
        warn!(
            capacity = config.capacity,
            "retention.capacity is very large; every batch is kept in memory"
        );
    }

    Ok(())
}

fn validate_frontend_config(config: &FrontendConfig) -> Result<()> {
    if config.static_dir.is_empty() {
        bail!("frontend.static_dir must not be empty");
    }

    if config.index.is_empty() {
        bail!("frontend.index must not be empty");
    }

    Ok(())
}

fn validate_request_config(config: &RequestConfig) -> Result<()> {
    if config.max_payload_bytes == 0 {
        bail!("request.max_payload_bytes must be greater than 0");
    }

    // Warn about very large payloads
    if config.max_payload_bytes > 100 * 1024 * 1024 {
        // 100 MB
        warn!(
            max_payload_bytes = config.max_payload_bytes,
            "request.max_payload_bytes is very large; may cause issues"
        );
    }

    Ok(())
}
