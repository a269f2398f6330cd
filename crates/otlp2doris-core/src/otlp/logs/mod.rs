// Convert OTLP log records to Doris rows
//
// One row per log record; resource and scope fields are repeated on every row.

use otlp2doris_proto::opentelemetry::proto::{
    collector::logs::v1::ExportLogsServiceRequest, logs::v1::LogRecord,
};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::otlp::common::{
    any_value::{any_value_as_text, attributes_to_map},
    context::{ResourceContext, ScopeContext, SharedAttributes},
    ids::{span_id_hex, trace_id_hex},
    time::format_timestamp,
    MappingOptions,
};
use crate::rows::RowCollection;

/// A row of the logs table.
#[derive(Debug, Clone, Serialize)]
pub struct LogRow {
    pub service_name: String,
    pub timestamp: String,
    pub service_instance_id: String,
    pub trace_id: String,
    pub span_id: String,
    pub severity_number: i32,
    pub severity_text: String,
    pub body: String,
    pub resource_attributes: SharedAttributes,
    pub log_attributes: JsonMap<String, JsonValue>,
    pub scope_name: String,
    pub scope_version: String,
}

/// Flatten a logs request into a single `RowCollection::Logs`.
pub fn logs_to_rows(request: &ExportLogsServiceRequest, options: &MappingOptions) -> RowCollection {
    let capacity = request
        .resource_logs
        .iter()
        .flat_map(|rl| &rl.scope_logs)
        .map(|sl| sl.log_records.len())
        .sum();
    let mut rows = Vec::with_capacity(capacity);

    for resource_logs in &request.resource_logs {
        let resource = ResourceContext::from_resource(resource_logs.resource.as_ref());
        for scope_logs in &resource_logs.scope_logs {
            let scope = ScopeContext::from_scope(scope_logs.scope.as_ref());
            rows.extend(
                scope_logs
                    .log_records
                    .iter()
                    .map(|record| log_row(record, &resource, &scope, options)),
            );
        }
    }

    RowCollection::Logs(rows)
}

fn log_row(
    record: &LogRecord,
    resource: &ResourceContext,
    scope: &ScopeContext,
    options: &MappingOptions,
) -> LogRow {
    // Records without an event time fall back to the time they were observed.
    let timestamp_nanos = if record.time_unix_nano != 0 {
        record.time_unix_nano
    } else {
        record.observed_time_unix_nano
    };

    LogRow {
        service_name: resource.service_name.clone(),
        timestamp: format_timestamp(timestamp_nanos, &options.timezone),
        service_instance_id: resource.service_instance_id.clone(),
        trace_id: trace_id_hex(&record.trace_id),
        span_id: span_id_hex(&record.span_id),
        severity_number: record.severity_number,
        severity_text: record.severity_text.clone(),
        body: any_value_as_text(record.body.as_ref()),
        resource_attributes: resource.attributes.clone(),
        log_attributes: attributes_to_map(&record.attributes),
        scope_name: scope.name.clone(),
        scope_version: scope.version.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otlp2doris_proto::opentelemetry::proto::{
        common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue, KeyValueList},
        logs::v1::{ResourceLogs, ScopeLogs},
        resource::v1::Resource,
    };

    fn string_value(s: &str) -> AnyValue {
        AnyValue {
            value: Some(any_value::Value::StringValue(s.to_string())),
        }
    }

    fn request_with(records: Vec<LogRecord>) -> ExportLogsServiceRequest {
        ExportLogsServiceRequest {
            resource_logs: vec![ResourceLogs {
                resource: Some(Resource {
                    attributes: vec![KeyValue {
                        key: "service.name".to_string(),
                        value: Some(string_value("checkout")),
                    }],
                    ..Default::default()
                }),
                scope_logs: vec![ScopeLogs {
                    scope: Some(InstrumentationScope {
                        name: "app".to_string(),
                        version: "1.2.0".to_string(),
                        ..Default::default()
                    }),
                    log_records: records,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_log_row_fields() {
        let record = LogRecord {
            time_unix_nano: 1_705_329_000_123_456_789,
            severity_number: 9,
            severity_text: "INFO".to_string(),
            body: Some(string_value("order placed")),
            trace_id: vec![0xab; 16],
            attributes: vec![KeyValue {
                key: "order.id".to_string(),
                value: Some(AnyValue {
                    value: Some(any_value::Value::IntValue(7)),
                }),
            }],
            ..Default::default()
        };

        let rows = logs_to_rows(&request_with(vec![record]), &MappingOptions::default());
        let RowCollection::Logs(rows) = rows else {
            panic!("expected log rows");
        };
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.service_name, "checkout");
        assert_eq!(row.service_instance_id, "");
        assert_eq!(row.timestamp, "2024-01-15 14:30:00.123456");
        assert_eq!(row.trace_id, "ab".repeat(16));
        assert_eq!(row.span_id, "0".repeat(16));
        assert_eq!(row.body, "order placed");
        assert_eq!(row.log_attributes["order.id"], serde_json::json!(7));
        assert_eq!(row.resource_attributes["service.name"], "checkout");
        assert_eq!(row.scope_name, "app");
        assert_eq!(row.scope_version, "1.2.0");
    }

    #[test]
    fn test_structured_body_renders_as_json() {
        let record = LogRecord {
            observed_time_unix_nano: 1_000_000_000,
            body: Some(AnyValue {
                value: Some(any_value::Value::KvlistValue(KeyValueList {
                    values: vec![KeyValue {
                        key: "event".to_string(),
                        value: Some(string_value("login")),
                    }],
                })),
            }),
            ..Default::default()
        };

        let rows = logs_to_rows(&request_with(vec![record]), &MappingOptions::default());
        let RowCollection::Logs(rows) = rows else {
            panic!("expected log rows");
        };
        assert_eq!(rows[0].body, r#"{"event":"login"}"#);
        assert_eq!(rows[0].timestamp, "1970-01-01 00:00:01.000000");
    }

    #[test]
    fn test_encoded_row_keys() {
        let rows = logs_to_rows(
            &request_with(vec![LogRecord::default()]),
            &MappingOptions::default(),
        );
        let encoded: JsonValue = serde_json::from_slice(&rows.encode().unwrap()).unwrap();
        let row = &encoded[0];
        for key in [
            "service_name",
            "timestamp",
            "service_instance_id",
            "trace_id",
            "span_id",
            "severity_number",
            "severity_text",
            "body",
            "resource_attributes",
            "log_attributes",
            "scope_name",
            "scope_version",
        ] {
            assert!(row.get(key).is_some(), "missing {key}");
        }
    }
}
