//! Shared OTLP mapping helpers used by multiple signal types.

use chrono::{FixedOffset, Offset, Utc};

pub mod any_value;
pub mod context;
pub mod field_names;
pub mod format;
pub mod ids;
pub mod time;

pub use format::{parse_request, InputFormat, OtlpSignalRequest};

/// Options controlling how OTLP values are rendered into rows.
#[derive(Debug, Clone, Copy)]
pub struct MappingOptions {
    /// Offset applied when rendering timestamps as Doris DATETIME strings.
    pub timezone: FixedOffset,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            timezone: Utc.fix(),
        }
    }
}

impl MappingOptions {
    pub fn with_timezone(timezone: FixedOffset) -> Self {
        Self { timezone }
    }
}
