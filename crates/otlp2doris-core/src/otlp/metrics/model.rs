// Row types for the five metric tables
//
// Every row embeds the shared `MetricBase` of the metric it came from; the
// base is flattened so the JSON object carries its fields at the top level.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::otlp::common::context::SharedAttributes;

/// Fields shared by every data point of one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricBase {
    pub service_name: String,
    pub service_instance_id: String,
    pub metric_name: String,
    pub metric_description: String,
    pub metric_unit: String,
    pub resource_attributes: SharedAttributes,
    pub scope_name: String,
    pub scope_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExemplarRow {
    pub filtered_attributes: JsonMap<String, JsonValue>,
    pub timestamp: String,
    pub value: f64,
    pub span_id: String,
    pub trace_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeRow {
    #[serde(flatten)]
    pub base: Arc<MetricBase>,
    pub timestamp: String,
    pub start_time: String,
    pub attributes: JsonMap<String, JsonValue>,
    pub value: f64,
    pub exemplars: Vec<ExemplarRow>,
    pub flags: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SumRow {
    #[serde(flatten)]
    pub base: Arc<MetricBase>,
    pub timestamp: String,
    pub start_time: String,
    pub attributes: JsonMap<String, JsonValue>,
    pub value: f64,
    pub exemplars: Vec<ExemplarRow>,
    pub flags: u32,
    pub aggregation_temporality: &'static str,
    pub is_monotonic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramRow {
    #[serde(flatten)]
    pub base: Arc<MetricBase>,
    pub timestamp: String,
    pub start_time: String,
    pub attributes: JsonMap<String, JsonValue>,
    pub count: u64,
    pub sum: f64,
    pub bucket_counts: Vec<u64>,
    pub explicit_bounds: Vec<f64>,
    pub exemplars: Vec<ExemplarRow>,
    pub min: f64,
    pub max: f64,
    pub aggregation_temporality: &'static str,
    pub flags: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExponentialHistogramRow {
    #[serde(flatten)]
    pub base: Arc<MetricBase>,
    pub timestamp: String,
    pub start_time: String,
    pub attributes: JsonMap<String, JsonValue>,
    pub count: u64,
    pub sum: f64,
    pub scale: i32,
    pub zero_count: u64,
    pub positive_offset: i32,
    pub positive_bucket_counts: Vec<u64>,
    pub negative_offset: i32,
    pub negative_bucket_counts: Vec<u64>,
    pub exemplars: Vec<ExemplarRow>,
    pub min: f64,
    pub max: f64,
    pub aggregation_temporality: &'static str,
    pub flags: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuantileValueRow {
    pub quantile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    #[serde(flatten)]
    pub base: Arc<MetricBase>,
    pub timestamp: String,
    pub start_time: String,
    pub attributes: JsonMap<String, JsonValue>,
    pub count: u64,
    pub sum: f64,
    pub quantile_values: Vec<QuantileValueRow>,
    pub flags: u32,
}
