// OTLP to Doris row mapping
//
// Each signal module walks the resource → scope → record tree of one export
// request and flattens it into rows of the matching Doris table.

pub mod common;
pub mod logs;
pub mod metrics;
pub mod traces;

pub use common::{parse_request, InputFormat, MappingOptions, OtlpSignalRequest};
