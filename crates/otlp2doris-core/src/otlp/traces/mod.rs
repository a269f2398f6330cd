// Convert OTLP spans to Doris rows

use otlp2doris_proto::opentelemetry::proto::{
    collector::trace::v1::ExportTraceServiceRequest,
    trace::v1::{
        span::{Event, Link, SpanKind},
        status::StatusCode,
        Span,
    },
};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::otlp::common::{
    any_value::attributes_to_map,
    context::{ResourceContext, ScopeContext, SharedAttributes},
    ids::{span_id_hex, trace_id_hex},
    time::{duration_micros, format_timestamp},
    MappingOptions,
};
use crate::rows::RowCollection;

/// A row of the traces table.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRow {
    pub service_name: String,
    pub timestamp: String,
    pub service_instance_id: String,
    pub trace_id: String,
    pub span_id: String,
    pub trace_state: String,
    pub parent_span_id: String,
    pub span_name: String,
    pub span_kind: &'static str,
    pub end_time: String,
    /// Span duration in microseconds.
    pub duration: i64,
    pub span_attributes: JsonMap<String, JsonValue>,
    pub events: Vec<EventRow>,
    pub links: Vec<LinkRow>,
    pub status_message: String,
    pub status_code: &'static str,
    pub resource_attributes: SharedAttributes,
    pub scope_name: String,
    pub scope_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub timestamp: String,
    pub name: String,
    pub attributes: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkRow {
    pub trace_id: String,
    pub span_id: String,
    pub trace_state: String,
    pub attributes: JsonMap<String, JsonValue>,
}

/// Flatten a traces request into a single `RowCollection::Traces`.
pub fn traces_to_rows(
    request: &ExportTraceServiceRequest,
    options: &MappingOptions,
) -> RowCollection {
    let capacity = request
        .resource_spans
        .iter()
        .flat_map(|rs| &rs.scope_spans)
        .map(|ss| ss.spans.len())
        .sum();
    let mut rows = Vec::with_capacity(capacity);

    for resource_spans in &request.resource_spans {
        let resource = ResourceContext::from_resource(resource_spans.resource.as_ref());
        for scope_spans in &resource_spans.scope_spans {
            let scope = ScopeContext::from_scope(scope_spans.scope.as_ref());
            rows.extend(
                scope_spans
                    .spans
                    .iter()
                    .map(|span| trace_row(span, &resource, &scope, options)),
            );
        }
    }

    RowCollection::Traces(rows)
}

fn trace_row(
    span: &Span,
    resource: &ResourceContext,
    scope: &ScopeContext,
    options: &MappingOptions,
) -> TraceRow {
    let (status_message, status_code) = match span.status.as_ref() {
        Some(status) => (status.message.clone(), status_code_name(status.code)),
        None => (String::new(), status_code_name(StatusCode::Unset as i32)),
    };

    TraceRow {
        service_name: resource.service_name.clone(),
        timestamp: format_timestamp(span.start_time_unix_nano, &options.timezone),
        service_instance_id: resource.service_instance_id.clone(),
        trace_id: trace_id_hex(&span.trace_id),
        span_id: span_id_hex(&span.span_id),
        trace_state: span.trace_state.clone(),
        parent_span_id: span_id_hex(&span.parent_span_id),
        span_name: span.name.clone(),
        span_kind: span_kind_name(span.kind),
        end_time: format_timestamp(span.end_time_unix_nano, &options.timezone),
        duration: duration_micros(span.start_time_unix_nano, span.end_time_unix_nano),
        span_attributes: attributes_to_map(&span.attributes),
        events: span.events.iter().map(|e| event_row(e, options)).collect(),
        links: span.links.iter().map(link_row).collect(),
        status_message,
        status_code,
        resource_attributes: resource.attributes.clone(),
        scope_name: scope.name.clone(),
        scope_version: scope.version.clone(),
    }
}

fn event_row(event: &Event, options: &MappingOptions) -> EventRow {
    EventRow {
        timestamp: format_timestamp(event.time_unix_nano, &options.timezone),
        name: event.name.clone(),
        attributes: attributes_to_map(&event.attributes),
    }
}

fn link_row(link: &Link) -> LinkRow {
    LinkRow {
        trace_id: trace_id_hex(&link.trace_id),
        span_id: span_id_hex(&link.span_id),
        trace_state: link.trace_state.clone(),
        attributes: attributes_to_map(&link.attributes),
    }
}

fn span_kind_name(kind: i32) -> &'static str {
    match SpanKind::try_from(kind) {
        Ok(SpanKind::Internal) => "Internal",
        Ok(SpanKind::Server) => "Server",
        Ok(SpanKind::Client) => "Client",
        Ok(SpanKind::Producer) => "Producer",
        Ok(SpanKind::Consumer) => "Consumer",
        Ok(SpanKind::Unspecified) | Err(_) => "Unspecified",
    }
}

fn status_code_name(code: i32) -> &'static str {
    match StatusCode::try_from(code) {
        Ok(StatusCode::Ok) => "Ok",
        Ok(StatusCode::Error) => "Error",
        Ok(StatusCode::Unset) | Err(_) => "Unset",
    }
}
