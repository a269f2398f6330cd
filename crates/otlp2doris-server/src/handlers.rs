// HTTP request handlers for server mode
//
// Implements OTLP ingestion and health check endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use otlp2doris_core::{parse_request, InputFormat, OtlpSignalRequest, SignalType};
use otlp2doris_exporter::{Batch, BatchId, ExportError};
use otlp2doris_proto::opentelemetry::proto::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};
use serde_json::json;
use std::time::Instant;
use tracing::debug;

use crate::{AppError, AppState};

/// POST /v1/logs - OTLP log ingestion endpoint
pub(crate) async fn handle_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: ExportLogsServiceRequest = decode(SignalType::Logs, &state, &headers, &body)?;
    let start = Instant::now();
    let id = BatchId::fingerprint(&request);
    let result = state.exporter.push_logs(Batch::new(id, &request)).await;
    finish(SignalType::Logs, request.record_count(), start, result)
}

/// POST /v1/traces - OTLP trace ingestion endpoint
pub(crate) async fn handle_traces(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: ExportTraceServiceRequest = decode(SignalType::Traces, &state, &headers, &body)?;
    let start = Instant::now();
    let id = BatchId::fingerprint(&request);
    let result = state.exporter.push_traces(Batch::new(id, &request)).await;
    finish(SignalType::Traces, request.record_count(), start, result)
}

/// POST /v1/metrics - OTLP metrics ingestion endpoint
pub(crate) async fn handle_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: ExportMetricsServiceRequest =
        decode(SignalType::Metrics, &state, &headers, &body)?;
    let start = Instant::now();
    let id = BatchId::fingerprint(&request);
    let result = state.exporter.push_metrics(Batch::new(id, &request)).await;
    finish(SignalType::Metrics, request.record_count(), start, result)
}

/// GET /health - Basic health check
pub(crate) async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

/// GET /ready - Readiness check
pub(crate) async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ready", "database": state.database})),
    )
}

fn decode<R: OtlpSignalRequest>(
    signal: SignalType,
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<R, AppError> {
    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());
    let format = InputFormat::from_content_type(content_type);

    debug!(
        "Received OTLP {} request ({} bytes, format: {:?}, content-type: {:?})",
        signal,
        body.len(),
        format,
        content_type
    );

    counter!("otlp.ingest.requests", 1, "signal" => signal.as_str());
    histogram!("otlp.ingest.bytes", body.len() as f64);

    if body.len() > state.max_payload_bytes {
        counter!("otlp.ingest.rejected", 1, "signal" => signal.as_str());
        return Err(AppError::with_status(
            StatusCode::PAYLOAD_TOO_LARGE,
            anyhow::anyhow!(
                "payload {} exceeds limit {}",
                body.len(),
                state.max_payload_bytes
            ),
        ));
    }

    parse_request(body, format).map_err(|e| {
        counter!("otlp.ingest.rejected", 1, "signal" => signal.as_str());
        AppError::with_status(
            StatusCode::BAD_REQUEST,
            e.context("Failed to parse OTLP request payload"),
        )
    })
}

fn finish(
    signal: SignalType,
    records: usize,
    start: Instant,
    result: Result<(), ExportError>,
) -> Result<Response, AppError> {
    histogram!(
        "otlp.ingest.latency_ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    match result {
        Ok(()) => {
            counter!("otlp.ingest.records", records as u64, "signal" => signal.as_str());
            debug!(records, "Loaded OTLP {} request", signal);
            Ok((StatusCode::OK, Json(json!({}))).into_response())
        }
        Err(e) => {
            // Retryable means the client may resend the same payload and
            // reuse the pending labels.
            let status = if e.is_retryable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_REQUEST
            };
            Err(AppError::with_status(status, anyhow::Error::new(e)))
        }
    }
}
