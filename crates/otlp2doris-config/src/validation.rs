// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Context, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_doris_config(&config.doris)?;
    validate_request_config(&config.request)?;

    if let Some(ref server) = config.server {
        validate_server_config(server)?;
    }

    Ok(())
}

fn validate_doris_config(config: &DorisConfig) -> Result<()> {
    if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
        bail!(
            "doris.endpoint must start with http:// or https://, got '{}'",
            config.endpoint
        );
    }

    validate_identifier("doris.database", &config.database)?;
    validate_identifier("doris.table.logs", &config.table.logs)?;
    validate_identifier("doris.table.traces", &config.table.traces)?;
    validate_identifier("doris.table.metrics", &config.table.metrics)?;
    validate_identifier("doris.label_prefix", &config.label_prefix)?;

    config.timezone()?;

    if config.timeout_secs == 0 {
        bail!("doris.timeout_secs must be greater than 0");
    }

    config.header_map().context("doris.headers is invalid")?;

    // Doris answers an over-long label with a bare Fail, which would retry forever.
    let label_len = config.max_label_len();
    if label_len > MAX_LABEL_LEN {
        bail!(
            "Stream Load labels would be up to {} characters, Doris allows {}; \
             shorten doris.label_prefix, doris.database or the table names",
            label_len,
            MAX_LABEL_LEN
        );
    }

    if config.username.is_empty() {
        warn!("doris.username is empty; Stream Load requests will likely be rejected");
    }

    Ok(())
}

// Database, table and label prefix all end up in the load URL and label.
fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{} must not be empty", field);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        bail!(
            "{} may only contain ASCII letters, digits, '_' and '-', got '{}'",
            field,
            value
        );
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
