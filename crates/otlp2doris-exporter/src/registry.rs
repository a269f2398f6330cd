// Retry label registry
//
// Remembers the label of every load that ended transiently so the next
// attempt for the same batch reuses it and Doris can deduplicate. One
// partition per table kind; kinds never contend with each other.

use std::collections::HashMap;

use otlp2doris_core::TableKind;
use parking_lot::RwLock;
use tracing::debug;

use crate::batch::BatchId;
use crate::response::Outcome;

#[derive(Debug)]
pub struct RetryRegistry {
    partitions: [RwLock<HashMap<BatchId, String>>; TableKind::COUNT],
}

impl Default for RetryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryRegistry {
    pub fn new() -> Self {
        Self {
            partitions: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }

    fn partition(&self, kind: TableKind) -> &RwLock<HashMap<BatchId, String>> {
        &self.partitions[kind.index()]
    }

    /// Label for the next load of `(kind, id)`: the pending retry label if
    /// one exists, otherwise a fresh one from `fresh`. Fresh labels are not
    /// stored until the load ends transiently.
    pub fn acquire_label(
        &self,
        kind: TableKind,
        id: BatchId,
        fresh: impl FnOnce() -> String,
    ) -> String {
        if let Some(label) = self.partition(kind).read().get(&id) {
            debug!(%kind, batch = %id, label = %label, "Reusing retry label");
            return label.clone();
        }
        fresh()
    }

    /// Settle a load: success and rejection forget the label, a transient
    /// failure keeps it for the next attempt.
    pub fn record_outcome(&self, kind: TableKind, id: BatchId, label: &str, outcome: Outcome) {
        let mut partition = self.partition(kind).write();
        match outcome {
            Outcome::Success | Outcome::Rejected => {
                partition.remove(&id);
            }
            Outcome::Transient => {
                partition.insert(id, label.to_string());
            }
        }
    }

    pub fn get(&self, kind: TableKind, id: BatchId) -> Option<String> {
        self.partition(kind).read().get(&id).cloned()
    }

    /// Pending retries for one table kind.
    pub fn len(&self, kind: TableKind) -> usize {
        self.partition(kind).read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(|p| p.read().is_empty())
    }
}
