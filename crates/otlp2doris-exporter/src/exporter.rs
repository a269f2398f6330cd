// DorisExporter: the entry point used by receivers.

use std::sync::Arc;

use anyhow::Result;
use otlp2doris_config::DorisConfig;
use otlp2doris_core::{
    logs_to_rows, metrics_to_rows, traces_to_rows, MappingOptions, SignalType,
};
use otlp2doris_proto::opentelemetry::proto::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};
use tracing::{info, instrument};

use crate::batch::Batch;
use crate::client::StreamLoadClient;
use crate::dispatcher::Dispatcher;
use crate::error::{ExportError, PushError};
use crate::label::LabelGenerator;
use crate::registry::RetryRegistry;
use crate::reporter::Reporter;

/// Maps OTLP export requests to rows and loads them into Doris.
///
/// Calls for different batches may run concurrently. Retrying a failed
/// batch means calling again with the same [`BatchId`](crate::BatchId); the
/// loads that ended transiently reuse their labels so Doris can drop
/// duplicates.
pub struct DorisExporter {
    dispatcher: Dispatcher,
    options: MappingOptions,
}

impl DorisExporter {
    pub fn new(config: &DorisConfig, reporter: Arc<dyn Reporter>) -> Result<Self> {
        Self::with_registry(config, reporter, Arc::new(RetryRegistry::new()))
    }

    /// Build an exporter sharing an existing retry registry.
    pub fn with_registry(
        config: &DorisConfig,
        reporter: Arc<dyn Reporter>,
        registry: Arc<RetryRegistry>,
    ) -> Result<Self> {
        let options = MappingOptions::with_timezone(config.timezone()?);
        let client = Arc::new(StreamLoadClient::new(config, reporter)?);
        let labels = LabelGenerator::new(&config.label_prefix, &config.database);

        info!(
            endpoint = %config.endpoint,
            database = %config.database,
            "Doris exporter ready"
        );

        Ok(Self {
            dispatcher: Dispatcher::new(client, registry, labels),
            options,
        })
    }

    pub fn registry(&self) -> &Arc<RetryRegistry> {
        self.dispatcher.registry()
    }

    #[instrument(skip_all, fields(batch = %batch.id()))]
    pub async fn push_logs(
        &self,
        batch: Batch<'_, ExportLogsServiceRequest>,
    ) -> Result<(), ExportError> {
        let rows = logs_to_rows(batch.data(), &self.options);
        self.dispatcher
            .dispatch(batch.id(), vec![rows], batch.deadline())
            .await
    }

    #[instrument(skip_all, fields(batch = %batch.id()))]
    pub async fn push_traces(
        &self,
        batch: Batch<'_, ExportTraceServiceRequest>,
    ) -> Result<(), ExportError> {
        let rows = traces_to_rows(batch.data(), &self.options);
        self.dispatcher
            .dispatch(batch.id(), vec![rows], batch.deadline())
            .await
    }

    /// Load one collection per metric shape present in the request.
    ///
    /// A metric without data fails the whole request before anything is sent.
    #[instrument(skip_all, fields(batch = %batch.id()))]
    pub async fn push_metrics(
        &self,
        batch: Batch<'_, ExportMetricsServiceRequest>,
    ) -> Result<(), ExportError> {
        let collections =
            metrics_to_rows(batch.data(), &self.options).map_err(|e| PushError::Construction {
                signal: SignalType::Metrics,
                table: self
                    .dispatcher
                    .client()
                    .base_table(SignalType::Metrics)
                    .to_string(),
                reason: e.to_string(),
            })?;
        self.dispatcher
            .dispatch(batch.id(), collections, batch.deadline())
            .await
    }

    /// Release pooled connections. In-flight loads already spawned still
    /// settle their registry entries.
    pub fn shutdown(self) {
        info!("Doris exporter shut down");
    }
}
