// otlp2doris-core - Platform-agnostic core logic
//
// This crate contains the PURE mapping logic from OTLP export requests to
// Doris table rows. No I/O, no async, no network access.
//
// - Essence: OTLP request → row collections (one per destination table)
// - Accident: HTTP delivery, retry bookkeeping (otlp2doris-exporter)

pub mod otlp;
pub mod rows;
pub mod types;

pub use otlp::common::{parse_request, InputFormat, MappingOptions, OtlpSignalRequest};
pub use otlp::logs::{logs_to_rows, LogRow};
pub use otlp::metrics::{
    count_data_points, metrics_to_rows, DataPointCounts, ExemplarRow, ExponentialHistogramRow,
    GaugeRow, HistogramRow, MetricBase, QuantileValueRow, SumRow, SummaryRow,
};
pub use otlp::traces::{traces_to_rows, EventRow, LinkRow, TraceRow};
pub use rows::{RowCollection, RowError};
pub use types::{MetricShape, SignalType, TableKind};
