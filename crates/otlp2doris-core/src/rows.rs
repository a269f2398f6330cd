//! Row collections produced by the mapper, one variant per destination table.

use serde::Serialize;
use thiserror::Error;

use crate::otlp::logs::LogRow;
use crate::otlp::metrics::{
    ExponentialHistogramRow, GaugeRow, HistogramRow, SumRow, SummaryRow,
};
use crate::otlp::traces::TraceRow;
use crate::types::{MetricShape, TableKind};

/// Errors raised while turning a request into loadable payloads.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("invalid metric type: metric '{name}' has no data")]
    UnknownMetricType { name: String },

    #[error("failed to encode {kind} rows as JSON: {source}")]
    Encode {
        kind: TableKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Rows bound for one Doris table.
#[derive(Debug, Clone)]
pub enum RowCollection {
    Logs(Vec<LogRow>),
    Traces(Vec<TraceRow>),
    Gauge(Vec<GaugeRow>),
    Sum(Vec<SumRow>),
    Histogram(Vec<HistogramRow>),
    ExponentialHistogram(Vec<ExponentialHistogramRow>),
    Summary(Vec<SummaryRow>),
}

impl RowCollection {
    pub fn kind(&self) -> TableKind {
        match self {
            RowCollection::Logs(_) => TableKind::Log,
            RowCollection::Traces(_) => TableKind::Trace,
            RowCollection::Gauge(_) => TableKind::Metric(MetricShape::Gauge),
            RowCollection::Sum(_) => TableKind::Metric(MetricShape::Sum),
            RowCollection::Histogram(_) => TableKind::Metric(MetricShape::Histogram),
            RowCollection::ExponentialHistogram(_) => {
                TableKind::Metric(MetricShape::ExponentialHistogram)
            }
            RowCollection::Summary(_) => TableKind::Metric(MetricShape::Summary),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowCollection::Logs(rows) => rows.len(),
            RowCollection::Traces(rows) => rows.len(),
            RowCollection::Gauge(rows) => rows.len(),
            RowCollection::Sum(rows) => rows.len(),
            RowCollection::Histogram(rows) => rows.len(),
            RowCollection::ExponentialHistogram(rows) => rows.len(),
            RowCollection::Summary(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode the rows as a JSON array, the body of a Stream Load request
    /// sent with `strip_outer_array: true`.
    pub fn encode(&self) -> Result<Vec<u8>, RowError> {
        let encoded = match self {
            RowCollection::Logs(rows) => to_json(rows),
            RowCollection::Traces(rows) => to_json(rows),
            RowCollection::Gauge(rows) => to_json(rows),
            RowCollection::Sum(rows) => to_json(rows),
            RowCollection::Histogram(rows) => to_json(rows),
            RowCollection::ExponentialHistogram(rows) => to_json(rows),
            RowCollection::Summary(rows) => to_json(rows),
        };
        encoded.map_err(|source| RowError::Encode {
            kind: self.kind(),
            source,
        })
    }
}

fn to_json<T: Serialize>(rows: &[T]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(rows)
}
