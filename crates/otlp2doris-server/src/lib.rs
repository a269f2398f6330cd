// Server mode - OTLP/HTTP receiver loading into Apache Doris
//
// Accepts OTLP export requests over HTTP (protobuf or JSON), maps them to
// rows and pushes them through Doris Stream Load.
//
// Features:
// - Axum HTTP server (HTTP/1.1, HTTP/2)
// - Content-derived batch ids so upstream retries reuse Stream Load labels
// - Structured logging with tracing
// - Periodic load progress reporting
// - Graceful shutdown

use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use otlp2doris_config::RuntimeConfig;
use otlp2doris_exporter::{DorisExporter, ProgressReporter};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

mod handlers;
mod init;

use handlers::{handle_logs, handle_metrics, handle_traces, health_check, ready_check};
pub use init::init_tracing;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<DorisExporter>,
    pub database: String,
    pub max_payload_bytes: usize,
}

/// Error type that implements IntoResponse
pub(crate) struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request error: {:#}", self.error);
        } else {
            warn!("Request rejected: {:#}", self.error);
        }
        (
            self.status,
            Json(json!({
                "error": format!("{:#}", self.error),
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }
}

/// Build the OTLP/HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/logs", post(handle_logs))
        .route("/v1/traces", post(handle_traces))
        .route("/v1/metrics", post(handle_metrics))
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .with_state(state)
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

/// Entry point for server mode with a resolved configuration.
///
/// Tracing must already be initialised.
pub async fn run_with_config(config: RuntimeConfig) -> Result<()> {
    let server = config.server.clone().unwrap_or_default();
    let addr = server.listen_addr;

    let reporter = Arc::new(ProgressReporter::new());
    let exporter = Arc::new(
        DorisExporter::new(&config.doris, reporter.clone())
            .context("Failed to create Doris exporter")?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let progress_task = config.doris.log_progress_interval().map(|interval| {
        let reporter = reporter.clone();
        tokio::spawn(async move { reporter.report(interval, shutdown_rx).await })
    });

    let max_payload_bytes = config.request.max_payload_bytes;
    info!("Max payload size set to {} bytes", max_payload_bytes);

    let state = AppState {
        exporter: exporter.clone(),
        database: config.doris.database.clone(),
        max_payload_bytes,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("OTLP HTTP endpoint listening on http://{}", addr);
    info!("Routes:");
    info!("  POST http://{}/v1/logs    - OTLP log ingestion", addr);
    info!("  POST http://{}/v1/traces  - OTLP trace ingestion", addr);
    info!("  POST http://{}/v1/metrics - OTLP metrics ingestion", addr);
    info!("  GET  http://{}/health     - Health check", addr);
    info!("  GET  http://{}/ready      - Readiness check", addr);
    info!("Press Ctrl+C or send SIGTERM to stop");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    // The reporter exits on either a send or a dropped sender.
    let _ = shutdown_tx.send(true);
    if let Some(task) = progress_task {
        if let Err(e) = task.await {
            warn!("Progress reporter ended abnormally: {}", e);
        }
    }

    match Arc::try_unwrap(exporter) {
        Ok(exporter) => exporter.shutdown(),
        Err(_) => warn!("Doris exporter still referenced at shutdown"),
    }

    let snapshot = reporter.snapshot();
    info!(
        rows_pushed = snapshot.rows_pushed,
        rows_failed = snapshot.rows_failed,
        bytes_sent = snapshot.bytes_sent,
        "Server shutdown complete"
    );

    served
}
