// Stream Load HTTP client
//
// One PUT per row collection against `{endpoint}/api/{db}/{table}/_stream_load`.
// The FE answers with a 307 pointing at a BE; redirects are followed by hand so
// credentials and body are re-sent to the new host.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use otlp2doris_config::{DorisConfig, TableConfig};
use otlp2doris_core::{RowCollection, SignalType, TableKind};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, EXPECT, LOCATION};
use reqwest::{redirect, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::error::PushError;
use crate::reporter::Reporter;
use crate::response::{classify, Outcome};

pub struct StreamLoadClient {
    http: reqwest::Client,
    endpoint: String,
    database: String,
    tables: TableConfig,
    username: String,
    password: String,
    headers: HeaderMap,
    max_redirects: usize,
    log_response: bool,
    reporter: Arc<dyn Reporter>,
}

impl StreamLoadClient {
    pub fn new(config: &DorisConfig, reporter: Arc<dyn Reporter>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to build Stream Load HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            tables: config.table.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            headers: config.header_map()?,
            max_redirects: config.max_redirects,
            log_response: config.log_response,
            reporter,
        })
    }

    /// Configured table name of a signal, before any shape suffix.
    pub fn base_table(&self, signal: SignalType) -> &str {
        match signal {
            SignalType::Logs => &self.tables.logs,
            SignalType::Traces => &self.tables.traces,
            SignalType::Metrics => &self.tables.metrics,
        }
    }

    /// Destination table of a row collection kind.
    pub fn table_name(&self, kind: TableKind) -> String {
        format!("{}{}", self.base_table(kind.signal()), kind.table_suffix())
    }

    pub fn load_url(&self, table: &str) -> String {
        format!(
            "{}/api/{}/{}/_stream_load",
            self.endpoint, self.database, table
        )
    }

    /// Load `rows` under `label`.
    ///
    /// `Ok` carries `Success` or `Rejected`; a transient outcome is returned
    /// as `PushError::Transient`.
    pub async fn push(&self, rows: &RowCollection, label: &str) -> Result<Outcome, PushError> {
        let kind = rows.kind();
        let signal = kind.signal();
        let table = self.table_name(kind);

        let construction = |reason: String| PushError::Construction {
            signal,
            table: table.clone(),
            reason,
        };
        let transient = |response: String| PushError::Transient {
            signal,
            table: table.clone(),
            response,
        };

        let payload = Bytes::from(rows.encode().map_err(|e| construction(e.to_string()))?);
        let label_value = HeaderValue::from_str(label)
            .map_err(|e| construction(format!("invalid label '{}': {}", label, e)))?;
        let mut url = Url::parse(&self.load_url(&table))
            .map_err(|e| construction(format!("invalid load URL: {}", e)))?;

        let mut redirects = 0;
        let response = loop {
            let response = self
                .http
                .put(url.clone())
                .basic_auth(&self.username, Some(&self.password))
                .header(EXPECT, "100-continue")
                .header(CONTENT_TYPE, "application/json")
                .header("format", "json")
                .header("strip_outer_array", "true")
                .header("label", label_value.clone())
                .headers(self.headers.clone())
                .body(payload.clone())
                .send()
                .await
                .map_err(|e| {
                    if e.is_builder() {
                        construction(e.to_string())
                    } else {
                        transient(e.to_string())
                    }
                })?;

            let status = response.status();
            if status != StatusCode::TEMPORARY_REDIRECT && status != StatusCode::PERMANENT_REDIRECT
            {
                break response;
            }
            if redirects >= self.max_redirects {
                return Err(transient(format!(
                    "too many redirects ({}) from {}",
                    redirects, url
                )));
            }
            let target = redirect_target(&url, response.headers())
                .ok_or_else(|| transient(format!("{} redirect without a valid Location", status)))?;
            // Drain the redirect body so the connection can be reused.
            let _ = response.bytes().await;
            url = target;
            redirects += 1;
            debug!(%table, %label, location = %url, "Following Stream Load redirect");
        };

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transient(format!("failed to read response body: {}", e)))?;
        let body_text = String::from_utf8_lossy(&body);

        match classify(status, &body).0 {
            Outcome::Success => {
                self.reporter.incr_rows_pushed(rows.len() as u64);
                self.reporter.incr_bytes_sent(payload.len() as u64);
                if self.log_response {
                    info!(%table, %label, "{} response:\n{}", signal, body_text);
                } else {
                    debug!(%table, %label, "{} response:\n{}", signal, body_text);
                }
                Ok(Outcome::Success)
            }
            Outcome::Rejected => {
                self.reporter.incr_rows_failed(rows.len() as u64);
                warn!(
                    %table,
                    %label,
                    rows = rows.len(),
                    "failed to push {} data, response:\n{}",
                    signal,
                    body_text
                );
                Ok(Outcome::Rejected)
            }
            Outcome::Transient if status.is_success() => Err(transient(body_text.into_owned())),
            Outcome::Transient => Err(transient(format!("HTTP {}: {}", status, body_text))),
        }
    }
}

fn redirect_target(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}
