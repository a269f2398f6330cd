// Convert OTLP metrics to Doris rows
//
// A metrics request fans out into up to five row collections, one per metric
// shape. A pre-scan sizes each collection exactly so no Vec grows mid-build.

mod model;

pub use model::{
    ExemplarRow, ExponentialHistogramRow, GaugeRow, HistogramRow, MetricBase, QuantileValueRow,
    SumRow, SummaryRow,
};

use std::sync::Arc;

use otlp2doris_proto::opentelemetry::proto::{
    collector::metrics::v1::ExportMetricsServiceRequest,
    metrics::v1::{
        exemplar, metric::Data, number_data_point, AggregationTemporality, Exemplar,
        ExponentialHistogramDataPoint, HistogramDataPoint, Metric, NumberDataPoint,
        SummaryDataPoint,
    },
};
use tracing::warn;

use crate::otlp::common::{
    any_value::attributes_to_map,
    context::{ResourceContext, ScopeContext},
    ids::{span_id_hex, trace_id_hex},
    time::format_timestamp,
    MappingOptions,
};
use crate::rows::{RowCollection, RowError};
use crate::types::MetricShape;

/// Data point counts per metric shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataPointCounts {
    pub gauge: usize,
    pub sum: usize,
    pub histogram: usize,
    pub exponential_histogram: usize,
    pub summary: usize,
}

impl DataPointCounts {
    pub fn get(&self, shape: MetricShape) -> usize {
        match shape {
            MetricShape::Gauge => self.gauge,
            MetricShape::Sum => self.sum,
            MetricShape::Histogram => self.histogram,
            MetricShape::ExponentialHistogram => self.exponential_histogram,
            MetricShape::Summary => self.summary,
        }
    }

    pub fn total(&self) -> usize {
        MetricShape::ALL.iter().map(|shape| self.get(*shape)).sum()
    }
}

/// Count data points per shape. Metrics without data are skipped here and
/// rejected by [`metrics_to_rows`].
pub fn count_data_points(request: &ExportMetricsServiceRequest) -> DataPointCounts {
    let mut counts = DataPointCounts::default();
    let metrics = request
        .resource_metrics
        .iter()
        .flat_map(|rm| &rm.scope_metrics)
        .flat_map(|sm| &sm.metrics);

    for metric in metrics {
        match metric.data.as_ref() {
            Some(Data::Gauge(gauge)) => counts.gauge += gauge.data_points.len(),
            Some(Data::Sum(sum)) => counts.sum += sum.data_points.len(),
            Some(Data::Histogram(h)) => counts.histogram += h.data_points.len(),
            Some(Data::ExponentialHistogram(h)) => {
                counts.exponential_histogram += h.data_points.len()
            }
            Some(Data::Summary(summary)) => counts.summary += summary.data_points.len(),
            None => {}
        }
    }

    counts
}

struct MetricRows {
    gauge: Vec<GaugeRow>,
    sum: Vec<SumRow>,
    histogram: Vec<HistogramRow>,
    exponential_histogram: Vec<ExponentialHistogramRow>,
    summary: Vec<SummaryRow>,
}

impl MetricRows {
    fn with_counts(counts: &DataPointCounts) -> Self {
        Self {
            gauge: Vec::with_capacity(counts.gauge),
            sum: Vec::with_capacity(counts.sum),
            histogram: Vec::with_capacity(counts.histogram),
            exponential_histogram: Vec::with_capacity(counts.exponential_histogram),
            summary: Vec::with_capacity(counts.summary),
        }
    }

    /// Non-empty collections in table index order.
    fn into_collections(self) -> Vec<RowCollection> {
        [
            RowCollection::Gauge(self.gauge),
            RowCollection::Sum(self.sum),
            RowCollection::Histogram(self.histogram),
            RowCollection::ExponentialHistogram(self.exponential_histogram),
            RowCollection::Summary(self.summary),
        ]
        .into_iter()
        .filter(|rows| !rows.is_empty())
        .collect()
    }
}

/// Flatten a metrics request into one row collection per metric shape present.
///
/// Shapes with no data points produce no collection. A metric whose data is
/// absent fails the whole request with [`RowError::UnknownMetricType`].
pub fn metrics_to_rows(
    request: &ExportMetricsServiceRequest,
    options: &MappingOptions,
) -> Result<Vec<RowCollection>, RowError> {
    let counts = count_data_points(request);
    let mut rows = MetricRows::with_counts(&counts);

    for resource_metrics in &request.resource_metrics {
        let resource = ResourceContext::from_resource(resource_metrics.resource.as_ref());
        for scope_metrics in &resource_metrics.scope_metrics {
            let scope = ScopeContext::from_scope(scope_metrics.scope.as_ref());
            for metric in &scope_metrics.metrics {
                process_metric(metric, &resource, &scope, options, &mut rows)?;
            }
        }
    }

    Ok(rows.into_collections())
}

fn process_metric(
    metric: &Metric,
    resource: &ResourceContext,
    scope: &ScopeContext,
    options: &MappingOptions,
    rows: &mut MetricRows,
) -> Result<(), RowError> {
    let data = metric
        .data
        .as_ref()
        .ok_or_else(|| RowError::UnknownMetricType {
            name: metric.name.clone(),
        })?;

    let base = Arc::new(MetricBase {
        service_name: resource.service_name.clone(),
        service_instance_id: resource.service_instance_id.clone(),
        metric_name: metric.name.clone(),
        metric_description: metric.description.clone(),
        metric_unit: metric.unit.clone(),
        resource_attributes: resource.attributes.clone(),
        scope_name: scope.name.clone(),
        scope_version: scope.version.clone(),
    });
    let ts = |nanos: u64| format_timestamp(nanos, &options.timezone);

    match data {
        Data::Gauge(gauge) => {
            rows.gauge.extend(gauge.data_points.iter().map(|point| GaugeRow {
                base: base.clone(),
                timestamp: ts(point.time_unix_nano),
                start_time: ts(point.start_time_unix_nano),
                attributes: attributes_to_map(&point.attributes),
                value: number_value(point),
                exemplars: exemplar_rows(&point.exemplars, options),
                flags: point.flags,
            }));
        }
        Data::Sum(sum) => {
            let temporality = temporality_name(sum.aggregation_temporality);
            rows.sum.extend(sum.data_points.iter().map(|point| SumRow {
                base: base.clone(),
                timestamp: ts(point.time_unix_nano),
                start_time: ts(point.start_time_unix_nano),
                attributes: attributes_to_map(&point.attributes),
                value: number_value(point),
                exemplars: exemplar_rows(&point.exemplars, options),
                flags: point.flags,
                aggregation_temporality: temporality,
                is_monotonic: sum.is_monotonic,
            }));
        }
        Data::Histogram(histogram) => {
            let temporality = temporality_name(histogram.aggregation_temporality);
            rows.histogram.extend(
                histogram
                    .data_points
                    .iter()
                    .map(|point| histogram_row(&base, point, temporality, options)),
            );
        }
        Data::ExponentialHistogram(histogram) => {
            let temporality = temporality_name(histogram.aggregation_temporality);
            rows.exponential_histogram.extend(
                histogram
                    .data_points
                    .iter()
                    .map(|point| exponential_histogram_row(&base, point, temporality, options)),
            );
        }
        Data::Summary(summary) => {
            rows.summary.extend(
                summary
                    .data_points
                    .iter()
                    .map(|point| summary_row(&base, point, options)),
            );
        }
    }

    Ok(())
}

fn histogram_row(
    base: &Arc<MetricBase>,
    point: &HistogramDataPoint,
    temporality: &'static str,
    options: &MappingOptions,
) -> HistogramRow {
    HistogramRow {
        base: base.clone(),
        timestamp: format_timestamp(point.time_unix_nano, &options.timezone),
        start_time: format_timestamp(point.start_time_unix_nano, &options.timezone),
        attributes: attributes_to_map(&point.attributes),
        count: point.count,
        sum: point.sum.unwrap_or_default(),
        bucket_counts: point.bucket_counts.clone(),
        explicit_bounds: point.explicit_bounds.clone(),
        exemplars: exemplar_rows(&point.exemplars, options),
        min: point.min.unwrap_or_default(),
        max: point.max.unwrap_or_default(),
        aggregation_temporality: temporality,
        flags: point.flags,
    }
}

fn exponential_histogram_row(
    base: &Arc<MetricBase>,
    point: &ExponentialHistogramDataPoint,
    temporality: &'static str,
    options: &MappingOptions,
) -> ExponentialHistogramRow {
    let (positive_offset, positive_bucket_counts) = point
        .positive
        .as_ref()
        .map(|b| (b.offset, b.bucket_counts.clone()))
        .unwrap_or_default();
    let (negative_offset, negative_bucket_counts) = point
        .negative
        .as_ref()
        .map(|b| (b.offset, b.bucket_counts.clone()))
        .unwrap_or_default();

    ExponentialHistogramRow {
        base: base.clone(),
        timestamp: format_timestamp(point.time_unix_nano, &options.timezone),
        start_time: format_timestamp(point.start_time_unix_nano, &options.timezone),
        attributes: attributes_to_map(&point.attributes),
        count: point.count,
        sum: point.sum.unwrap_or_default(),
        scale: point.scale,
        zero_count: point.zero_count,
        positive_offset,
        positive_bucket_counts,
        negative_offset,
        negative_bucket_counts,
        exemplars: exemplar_rows(&point.exemplars, options),
        min: point.min.unwrap_or_default(),
        max: point.max.unwrap_or_default(),
        aggregation_temporality: temporality,
        flags: point.flags,
    }
}

fn summary_row(
    base: &Arc<MetricBase>,
    point: &SummaryDataPoint,
    options: &MappingOptions,
) -> SummaryRow {
    SummaryRow {
        base: base.clone(),
        timestamp: format_timestamp(point.time_unix_nano, &options.timezone),
        start_time: format_timestamp(point.start_time_unix_nano, &options.timezone),
        attributes: attributes_to_map(&point.attributes),
        count: point.count,
        sum: point.sum,
        quantile_values: point
            .quantile_values
            .iter()
            .map(|q| QuantileValueRow {
                quantile: q.quantile,
                value: q.value,
            })
            .collect(),
        flags: point.flags,
    }
}

fn exemplar_rows(exemplars: &[Exemplar], options: &MappingOptions) -> Vec<ExemplarRow> {
    exemplars
        .iter()
        .map(|exemplar| ExemplarRow {
            filtered_attributes: attributes_to_map(&exemplar.filtered_attributes),
            timestamp: format_timestamp(exemplar.time_unix_nano, &options.timezone),
            value: exemplar_value(exemplar),
            span_id: span_id_hex(&exemplar.span_id),
            trace_id: trace_id_hex(&exemplar.trace_id),
        })
        .collect()
}

fn number_value(point: &NumberDataPoint) -> f64 {
    match point.value {
        Some(number_data_point::Value::AsDouble(value)) => value,
        Some(number_data_point::Value::AsInt(value)) => value as f64,
        None => {
            warn!("data point value type is unset, use 0.0 as default");
            0.0
        }
    }
}

fn exemplar_value(exemplar: &Exemplar) -> f64 {
    match exemplar.value {
        Some(exemplar::Value::AsDouble(value)) => value,
        Some(exemplar::Value::AsInt(value)) => value as f64,
        None => {
            warn!("exemplar value type is unset, use 0.0 as default");
            0.0
        }
    }
}

fn temporality_name(temporality: i32) -> &'static str {
    match AggregationTemporality::try_from(temporality) {
        Ok(AggregationTemporality::Delta) => "Delta",
        Ok(AggregationTemporality::Cumulative) => "Cumulative",
        Ok(AggregationTemporality::Unspecified) | Err(_) => "Unspecified",
    }
}
