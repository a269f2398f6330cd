use std::fmt;

use otlp2doris_core::SignalType;
use thiserror::Error;

/// Failure of a single Stream Load attempt.
#[derive(Debug, Error)]
pub enum PushError {
    /// The load may succeed if retried with the same label.
    #[error("failed to push {signal} data, response:{response}")]
    Transient {
        signal: SignalType,
        table: String,
        response: String,
    },

    /// The request could not be built; retrying the same batch cannot help.
    #[error("failed to build {signal} load for table {table}: {reason}")]
    Construction {
        signal: SignalType,
        table: String,
        reason: String,
    },
}

impl PushError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PushError::Transient { .. })
    }

    pub fn signal(&self) -> SignalType {
        match self {
            PushError::Transient { signal, .. } | PushError::Construction { signal, .. } => *signal,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            PushError::Transient { table, .. } | PushError::Construction { table, .. } => table,
        }
    }
}

/// Every failed load of one export call.
///
/// Always holds at least one failure.
#[derive(Debug)]
pub struct ExportError {
    failures: Vec<PushError>,
}

impl ExportError {
    /// Collect failures, `None` when there are none.
    pub fn from_failures(failures: Vec<PushError>) -> Option<Self> {
        (!failures.is_empty()).then_some(Self { failures })
    }

    pub fn failures(&self) -> &[PushError] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<PushError> {
        self.failures
    }

    /// True when retrying the batch with the same id can make progress.
    pub fn is_retryable(&self) -> bool {
        self.failures.iter().any(PushError::is_transient)
    }
}

impl From<PushError> for ExportError {
    fn from(error: PushError) -> Self {
        Self {
            failures: vec![error],
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExportError {}
