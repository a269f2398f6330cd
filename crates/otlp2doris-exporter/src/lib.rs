// otlp2doris-exporter - Doris Stream Load delivery
//
// Turns OTLP export requests into Stream Load calls with idempotent retry:
// every load carries a label, and a load that ends transiently keeps its
// label in the retry registry so the next attempt for the same batch reuses
// it. Doris drops loads whose label already committed.
//
// - batch:      explicit batch identity
// - registry:   (table kind, batch) → pending label
// - client:     one HTTP PUT per row collection, response classification
// - dispatcher: concurrent loads per export call, failure aggregation
// - reporter:   rows/bytes self-telemetry

mod batch;
mod client;
mod dispatcher;
mod error;
mod exporter;
mod label;
mod registry;
mod reporter;
mod response;

pub use batch::{Batch, BatchId};
pub use client::StreamLoadClient;
pub use error::{ExportError, PushError};
pub use exporter::DorisExporter;
pub use label::LabelGenerator;
pub use registry::RetryRegistry;
pub use reporter::{NoopReporter, ProgressReporter, ProgressSnapshot, Reporter};
pub use response::{classify, Outcome, StreamLoadResponse};
