use anyhow::{Context, Result};
use otlp2doris_proto::opentelemetry::proto::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};
use prost::Message;
use serde::de::DeserializeOwned;

/// Supported input formats for OTLP payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Binary protobuf (default, most efficient)
    Protobuf,
    /// JSON (OTLP spec required)
    Json,
}

impl InputFormat {
    /// Detect format from Content-Type header.
    ///
    /// Defaults to Protobuf if header is missing or unrecognized.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.to_lowercase().contains("application/json") => Self::Json,
            _ => Self::Protobuf,
        }
    }

    /// Get the canonical Content-Type string for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Protobuf => "application/x-protobuf",
            Self::Json => "application/json",
        }
    }
}

/// Trait implemented by OTLP signal request types that can be parsed from multiple formats.
pub trait OtlpSignalRequest: Message + Default + DeserializeOwned {
    /// Number of leaf records (log records, spans or data points) in the request.
    fn record_count(&self) -> usize;
}

/// Parse OTLP requests from bytes in the specified format.
pub fn parse_request<R>(bytes: &[u8], format: InputFormat) -> Result<R>
where
    R: OtlpSignalRequest,
{
    match format {
        InputFormat::Protobuf => R::decode(bytes).context("Failed to decode OTLP protobuf message"),
        InputFormat::Json => {
            serde_json::from_slice(bytes).context("Failed to parse OTLP JSON message")
        }
    }
}

impl OtlpSignalRequest for ExportLogsServiceRequest {
    fn record_count(&self) -> usize {
        self.resource_logs
            .iter()
            .flat_map(|rl| &rl.scope_logs)
            .map(|sl| sl.log_records.len())
            .sum()
    }
}

impl OtlpSignalRequest for ExportTraceServiceRequest {
    fn record_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum()
    }
}

impl OtlpSignalRequest for ExportMetricsServiceRequest {
    fn record_count(&self) -> usize {
        crate::otlp::metrics::count_data_points(self).total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_content_type() {
        assert_eq!(
            InputFormat::from_content_type(Some("application/x-protobuf")),
            InputFormat::Protobuf
        );
        assert_eq!(
            InputFormat::from_content_type(Some("application/JSON; charset=utf-8")),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::from_content_type(Some("text/plain")),
            InputFormat::Protobuf
        );
        assert_eq!(InputFormat::from_content_type(None), InputFormat::Protobuf);
    }

    #[test]
    fn test_format_content_type() {
        assert_eq!(
            InputFormat::Protobuf.content_type(),
            "application/x-protobuf"
        );
        assert_eq!(InputFormat::Json.content_type(), "application/json");
    }

    #[test]
    fn test_parse_empty_protobuf() {
        let request = ExportLogsServiceRequest::default();
        let bytes = request.encode_to_vec();
        let parsed: ExportLogsServiceRequest =
            parse_request(&bytes, InputFormat::Protobuf).unwrap();
        assert_eq!(parsed.record_count(), 0);
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_request::<ExportTraceServiceRequest>(b"{not json", InputFormat::Json);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse OTLP JSON"));
    }
}
