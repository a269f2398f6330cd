// Batch identity
//
// Retry labels are keyed by an explicit id chosen by the caller. Retrying a
// batch means calling the exporter again with the same id.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use prost::Message;
use tokio::time::Instant;

static NEXT_BATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one export batch across retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(u64);

impl BatchId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Next id from a process-wide sequence.
    pub fn next() -> Self {
        Self(NEXT_BATCH_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Content fingerprint of a request: equal requests get equal ids.
    pub fn fingerprint<M: Message>(request: &M) -> Self {
        let hash = blake3::hash(&request.encode_to_vec());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_le_bytes(prefix))
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A borrowed export request together with its identity and optional deadline.
#[derive(Debug)]
pub struct Batch<'a, T> {
    id: BatchId,
    data: &'a T,
    deadline: Option<Instant>,
}

impl<'a, T> Batch<'a, T> {
    pub fn new(id: BatchId, data: &'a T) -> Self {
        Self {
            id,
            data,
            deadline: None,
        }
    }

    /// Bound every load of this batch; loads still running at `deadline`
    /// count as transient failures.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn data(&self) -> &'a T {
        self.data
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
