//! Signal and destination table kinds shared by the mapper and the exporter

use std::fmt;

/// OpenTelemetry signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    /// Logs signal
    Logs,
    /// Traces signal
    Traces,
    /// Metrics signal
    Metrics,
}

impl SignalType {
    /// Singular noun used in log lines and push error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Logs => "log",
            SignalType::Traces => "trace",
            SignalType::Metrics => "metric",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five OTLP metric shapes, each loaded into its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricShape {
    Gauge,
    Sum,
    Histogram,
    ExponentialHistogram,
    Summary,
}

impl MetricShape {
    pub const ALL: [MetricShape; 5] = [
        MetricShape::Gauge,
        MetricShape::Sum,
        MetricShape::Histogram,
        MetricShape::ExponentialHistogram,
        MetricShape::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricShape::Gauge => "gauge",
            MetricShape::Sum => "sum",
            MetricShape::Histogram => "histogram",
            MetricShape::ExponentialHistogram => "exponential_histogram",
            MetricShape::Summary => "summary",
        }
    }

    /// Suffix appended to the configured metrics table name.
    pub fn table_suffix(&self) -> &'static str {
        match self {
            MetricShape::Gauge => "_gauge",
            MetricShape::Sum => "_sum",
            MetricShape::Histogram => "_histogram",
            MetricShape::ExponentialHistogram => "_exponential_histogram",
            MetricShape::Summary => "_summary",
        }
    }
}

impl fmt::Display for MetricShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination table kind of a row collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Log,
    Trace,
    Metric(MetricShape),
}

impl TableKind {
    /// Number of distinct table kinds.
    pub const COUNT: usize = 7;

    pub const ALL: [TableKind; Self::COUNT] = [
        TableKind::Log,
        TableKind::Trace,
        TableKind::Metric(MetricShape::Gauge),
        TableKind::Metric(MetricShape::Sum),
        TableKind::Metric(MetricShape::Histogram),
        TableKind::Metric(MetricShape::ExponentialHistogram),
        TableKind::Metric(MetricShape::Summary),
    ];

    /// Dense index in `0..COUNT`, stable across releases.
    pub fn index(&self) -> usize {
        match self {
            TableKind::Log => 0,
            TableKind::Trace => 1,
            TableKind::Metric(MetricShape::Gauge) => 2,
            TableKind::Metric(MetricShape::Sum) => 3,
            TableKind::Metric(MetricShape::Histogram) => 4,
            TableKind::Metric(MetricShape::ExponentialHistogram) => 5,
            TableKind::Metric(MetricShape::Summary) => 6,
        }
    }

    pub fn signal(&self) -> SignalType {
        match self {
            TableKind::Log => SignalType::Logs,
            TableKind::Trace => SignalType::Traces,
            TableKind::Metric(_) => SignalType::Metrics,
        }
    }

    /// Suffix appended to the signal's base table name.
    pub fn table_suffix(&self) -> &'static str {
        match self {
            TableKind::Log | TableKind::Trace => "",
            TableKind::Metric(shape) => shape.table_suffix(),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Log => f.write_str("log"),
            TableKind::Trace => f.write_str("trace"),
            TableKind::Metric(shape) => write!(f, "metric_{}", shape),
        }
    }
}
