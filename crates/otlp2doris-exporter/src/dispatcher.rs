// Parallel dispatch of row collections
//
// Every collection of one export call is loaded by its own detached task. The
// task settles the registry itself, so an abandoned export still leaves the
// registry consistent with what Doris saw.

use std::sync::Arc;

use futures::future::join_all;
use otlp2doris_core::{RowCollection, TableKind};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::batch::BatchId;
use crate::client::StreamLoadClient;
use crate::error::{ExportError, PushError};
use crate::label::LabelGenerator;
use crate::registry::RetryRegistry;
use crate::response::Outcome;

pub(crate) struct Dispatcher {
    client: Arc<StreamLoadClient>,
    registry: Arc<RetryRegistry>,
    labels: LabelGenerator,
}

struct Pending {
    kind: TableKind,
    label: String,
    handle: JoinHandle<Result<Outcome, PushError>>,
}

impl Dispatcher {
    pub(crate) fn new(
        client: Arc<StreamLoadClient>,
        registry: Arc<RetryRegistry>,
        labels: LabelGenerator,
    ) -> Self {
        Self {
            client,
            registry,
            labels,
        }
    }

    pub(crate) fn client(&self) -> &StreamLoadClient {
        &self.client
    }

    pub(crate) fn registry(&self) -> &Arc<RetryRegistry> {
        &self.registry
    }

    /// Load every collection concurrently and gather all failures.
    ///
    /// Empty collections are skipped.
    pub(crate) async fn dispatch(
        &self,
        id: BatchId,
        collections: Vec<RowCollection>,
        deadline: Option<Instant>,
    ) -> Result<(), ExportError> {
        let pending: Vec<Pending> = collections
            .into_iter()
            .filter(|rows| !rows.is_empty())
            .map(|rows| self.spawn_load(id, rows, deadline))
            .collect();

        let settled = join_all(pending.into_iter().map(|p| async move {
            let result = p.handle.await;
            (p.kind, p.label, result)
        }))
        .await;

        let mut failures = Vec::new();
        for (kind, label, result) in settled {
            match result {
                Ok(Ok(_)) => {}
                Ok(Err(error)) => failures.push(error),
                Err(join_error) => {
                    warn!(%kind, batch = %id, %label, error = %join_error, "Load task failed");
                    self.registry
                        .record_outcome(kind, id, &label, Outcome::Transient);
                    failures.push(PushError::Transient {
                        signal: kind.signal(),
                        table: self.client.table_name(kind),
                        response: format!("load task failed: {}", join_error),
                    });
                }
            }
        }

        match ExportError::from_failures(failures) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn spawn_load(&self, id: BatchId, rows: RowCollection, deadline: Option<Instant>) -> Pending {
        let kind = rows.kind();
        let label = self
            .registry
            .acquire_label(kind, id, || self.labels.generate(&self.client.table_name(kind)));
        debug!(%kind, batch = %id, %label, rows = rows.len(), "Dispatching load");

        let client = Arc::clone(&self.client);
        let registry = Arc::clone(&self.registry);
        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            let push = client.push(&rows, &task_label);
            let result = match deadline {
                Some(deadline) => match timeout_at(deadline, push).await {
                    Ok(result) => result,
                    Err(_) => Err(PushError::Transient {
                        signal: kind.signal(),
                        table: client.table_name(kind),
                        response: "deadline exceeded before Doris responded".to_string(),
                    }),
                },
                None => push.await,
            };

            match &result {
                Ok(outcome) => registry.record_outcome(kind, id, &task_label, *outcome),
                Err(error) if error.is_transient() => {
                    registry.record_outcome(kind, id, &task_label, Outcome::Transient)
                }
                // Construction failures are not retryable; leave the entry alone.
                Err(_) => {}
            }
            result
        });

        Pending {
            kind,
            label,
            handle,
        }
    }
}
