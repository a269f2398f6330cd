use super::{LogFormat, RuntimeConfig, ServerConfig};
use anyhow::{anyhow, Result};

pub const ENV_PREFIX: &str = "OTLP2DORIS_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    /// Get a variable by its name without the `OTLP2DORIS_` prefix.
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Doris target
    if let Some(endpoint) = get_env_string(env, "ENDPOINT") {
        config.doris.endpoint = endpoint;
    }
    if let Some(database) = get_env_string(env, "DATABASE") {
        config.doris.database = database;
    }
    if let Some(username) = get_env_string(env, "USERNAME") {
        config.doris.username = username;
    }
    if let Some(password) = get_env_string(env, "PASSWORD") {
        config.doris.password = password;
    }
    if let Some(table) = get_env_string(env, "TABLE_LOGS") {
        config.doris.table.logs = table;
    }
    if let Some(table) = get_env_string(env, "TABLE_TRACES") {
        config.doris.table.traces = table;
    }
    if let Some(table) = get_env_string(env, "TABLE_METRICS") {
        config.doris.table.metrics = table;
    }
    if let Some(prefix) = get_env_string(env, "LABEL_PREFIX") {
        config.doris.label_prefix = prefix;
    }
    if let Some(timezone) = get_env_string(env, "TIMEZONE") {
        config.doris.timezone = timezone;
    }
    if let Some(val) = get_env_u64(env, "TIMEOUT_SECS")? {
        config.doris.timeout_secs = val;
    }
    if let Some(val) = get_env_usize(env, "MAX_REDIRECTS")? {
        config.doris.max_redirects = val;
    }
    if let Some(val) = get_env_bool(env, "LOG_RESPONSE")? {
        config.doris.log_response = val;
    }
    if let Some(val) = get_env_u64(env, "LOG_PROGRESS_INTERVAL_SECS")? {
        config.doris.log_progress_interval_secs = val;
    }

    // Request configuration
    if let Some(val) = get_env_usize(env, "MAX_PAYLOAD_BYTES")? {
        config.request.max_payload_bytes = val;
    }

    // Server configuration (listen addr, log level/format)
    if let Some(addr) = get_env_string(env, "LISTEN_ADDR") {
        ensure_server(config).listen_addr = addr;
    }
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        ensure_server(config).log_level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        let parsed = match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
        ensure_server(config).log_format = parsed;
    }

    Ok(())
}

fn ensure_server(config: &mut RuntimeConfig) -> &mut ServerConfig {
    config.server.get_or_insert_with(ServerConfig::default)
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    get_env_string(env, key)
        .map(|val| {
            val.parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))
        })
        .transpose()
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    get_env_string(env, key)
        .map(|val| {
            val.parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))
        })
        .transpose()
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val.parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
