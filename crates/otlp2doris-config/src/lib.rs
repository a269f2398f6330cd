// otlp2doris-config - Configuration for the Doris exporter
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from --config or OTLP2DORIS_CONFIG
// 3. Config file contents from OTLP2DORIS_CONFIG_CONTENT
// 4. Default config file locations (./config.toml, ./.otlp2doris.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use sources::{load_from_file_path, load_from_str};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub doris: DorisConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
}

/// Doris Stream Load target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DorisConfig {
    /// Frontend HTTP endpoint, e.g. `http://fe:8030`.
    pub endpoint: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub table: TableConfig,
    /// Prefix of every Stream Load label.
    pub label_prefix: String,
    /// Extra headers sent with every Stream Load request.
    pub headers: BTreeMap<String, String>,
    /// Fixed UTC offset (`+08:00`) used to render DATETIME columns.
    pub timezone: String,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    /// Log successful responses at info instead of debug.
    pub log_response: bool,
    /// Interval of progress log lines, 0 disables them.
    pub log_progress_interval_secs: u64,
}

impl Default for DorisConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8030".to_string(),
            database: "otel".to_string(),
            username: "root".to_string(),
            password: String::new(),
            table: TableConfig::default(),
            label_prefix: "otel".to_string(),
            headers: BTreeMap::new(),
            timezone: "+00:00".to_string(),
            timeout_secs: 30,
            max_redirects: 3,
            log_response: false,
            log_progress_interval_secs: 10,
        }
    }
}

impl DorisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Progress reporting interval, `None` when disabled.
    pub fn log_progress_interval(&self) -> Option<Duration> {
        (self.log_progress_interval_secs > 0)
            .then(|| Duration::from_secs(self.log_progress_interval_secs))
    }

    /// Parse the configured timezone as a fixed offset.
    pub fn timezone(&self) -> Result<FixedOffset> {
        parse_timezone(&self.timezone)
    }

    /// Custom Stream Load headers as an HTTP header map.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let header_value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid header value for {}", name))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Length of the longest label this configuration can produce:
    /// `{prefix}_{database}_{table}_{yyyyMMddHHmmss}_{uuid}`.
    pub fn max_label_len(&self) -> usize {
        let longest_table = [
            self.table.logs.len(),
            self.table.traces.len(),
            self.table.metrics.len() + LONGEST_METRIC_SUFFIX.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        self.label_prefix.len() + self.database.len() + longest_table + LABEL_FIXED_LEN
    }
}

/// Doris rejects Stream Load labels longer than this.
pub const MAX_LABEL_LEN: usize = 128;

const LONGEST_METRIC_SUFFIX: &str = "_exponential_histogram";

// Four separators, a 14-digit timestamp and a hyphenated UUID.
const LABEL_FIXED_LEN: usize = 4 + 14 + 36;

/// Base table names; metric tables get a per-shape suffix appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub logs: String,
    pub traces: String,
    pub metrics: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            logs: "otel_logs".to_string(),
            traces: "otel_traces".to_string(),
            metrics: "otel_metrics".to_string(),
        }
    }
}

/// Request handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub max_payload_bytes: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4318".to_string(),
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

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

/// Parse `±HH:MM` (or `Z`/`UTC`) into a fixed offset.
pub fn parse_timezone(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return Ok(Utc.fix());
    }
    value
        .parse::<FixedOffset>()
        .with_context(|| format!("Invalid timezone '{}': expected an offset like +08:00", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let doris = DorisConfig::default();
        assert_eq!(doris.endpoint, "http://localhost:8030");
        assert_eq!(doris.table.metrics, "otel_metrics");
        assert_eq!(doris.timeout(), Duration::from_secs(30));
        assert_eq!(doris.log_progress_interval(), Some(Duration::from_secs(10)));

        let server = ServerConfig::default();
        assert_eq!(server.listen_addr, "0.0.0.0:4318");
        assert_eq!(server.log_format, LogFormat::Text);
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_timezone("-05:30").unwrap().local_minus_utc(), -(5 * 3600 + 1800));
        assert_eq!(parse_timezone("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_timezone("Asia/Shanghai").is_err());
    }

    #[test]
    fn test_max_label_len_uses_longest_table() {
        let doris = DorisConfig::default();
        // otel_otel_otel_metrics_exponential_histogram_{ts}_{uuid}
        assert_eq!(
            doris.max_label_len(),
            "otel_otel_otel_metrics_exponential_histogram".len() + 1 + 14 + 1 + 36
        );

        let long_logs = DorisConfig {
            table: TableConfig {
                logs: "l".repeat(80),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(long_logs.max_label_len(), 4 + 4 + 80 + 4 + 14 + 36);
    }

    #[test]
    fn test_header_map() {
        let mut doris = DorisConfig::default();
        doris
            .headers
            .insert("max_filter_ratio".to_string(), "0.1".to_string());
        assert_eq!(doris.header_map().unwrap()["max_filter_ratio"], "0.1");

        doris.headers.insert("bad header".to_string(), "x".to_string());
        assert!(doris.header_map().is_err());
    }

    #[test]
    fn test_progress_interval_disabled() {
        let doris = DorisConfig {
            log_progress_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(doris.log_progress_interval(), None);
    }
}
