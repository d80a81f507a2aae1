use crate::{
    accumulator::BatchAccumulator,
    coerce::ValueCoercer,
    error::SinkError,
    metrics::{Metrics, MetricsSnapshot},
    schema::catalog::TableSchema,
    writer::TransactionalBatchWriter,
};
use connectors::{adapter::Adapter, sql::base::adapter::SqlAdapter};
use futures::{Stream, StreamExt, stream};
use model::records::{batch::Batch, record::Record};
use sink_config::{properties::Properties, settings::SinkConfig};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of one host flush call.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub events_count: usize,
    pub rows_written: usize,
    pub batches_written: usize,
    pub batches_failed: usize,
    pub errors: Vec<SinkError>,
}

impl FlushReport {
    pub fn is_ok(&self) -> bool {
        self.batches_failed == 0
    }
}

/// One configured output: the discovered schema, batching limits and the
/// pooled connection. Flushes of the same instance must not overlap.
pub struct SinkInstance {
    id: String,
    config: SinkConfig,
    adapter: Arc<dyn SqlAdapter>,
    writer: TransactionalBatchWriter,
    metrics: Metrics,
}

impl SinkInstance {
    /// Parses the properties, connects and discovers the target table.
    pub async fn init(props: &Properties) -> Result<Self, SinkError> {
        let config = SinkConfig::from_properties(props)?;
        let settings = config.connection_settings()?;
        let adapter = Adapter::sql(&config.dialect, &settings)?.into_sql();
        Self::with_adapter(config, adapter).await
    }

    pub async fn with_adapter(
        config: SinkConfig,
        adapter: Arc<dyn SqlAdapter>,
    ) -> Result<Self, SinkError> {
        let id = Uuid::new_v4().simple().to_string();

        info!(instance_id = %id, dsn = %config.dsn(), table = %config.table, "Initializing sink instance");

        let schema = TableSchema::discover(adapter.as_ref(), &config.table, &config.ignore_columns)
            .await
            .inspect_err(|e| error!(instance_id = %id, error = %e, "Sink instance initialization failed"))?;

        info!(instance_id = %id, sql = %schema.insert_sql, "Prepared insert statement");

        let metrics = Metrics::new();
        let writer = TransactionalBatchWriter::new(
            adapter.clone(),
            Arc::new(schema),
            ValueCoercer::new(config.on_coercion_error),
        )
        .with_timeout(config.write_timeout)
        .with_metrics(metrics.clone());

        Ok(SinkInstance {
            id,
            config,
            adapter,
            writer,
            metrics,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn schema(&self) -> &TableSchema {
        self.writer.schema()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn flush<I>(&self, records: I, tag: &str) -> FlushReport
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: Send,
    {
        self.flush_stream(stream::iter(records), tag).await
    }

    /// Drives one delivery: records are accumulated and written whenever the
    /// size or linger threshold is hit, and the remainder at end of stream.
    /// A failed batch is reported and dropped; later batches are still tried.
    pub async fn flush_stream<S>(&self, records: S, tag: &str) -> FlushReport
    where
        S: Stream<Item = Record> + Send,
    {
        let mut records = std::pin::pin!(records);
        let mut accumulator = BatchAccumulator::new(self.config.batch_size, self.config.linger);
        let mut report = FlushReport::default();

        while let Some(record) = records.next().await {
            report.events_count += 1;
            accumulator.ingest(record);

            if accumulator.should_flush() {
                let batch = accumulator.drain();
                self.write_batch(&batch, tag, &mut report).await;
            }
        }

        if let Some(batch) = accumulator.finish() {
            self.write_batch(&batch, tag, &mut report).await;
        }

        self.metrics.increment_records(report.events_count as u64);

        info!(
            instance_id = %self.id,
            tag = %tag,
            events_count = report.events_count,
            batches_written = report.batches_written,
            batches_failed = report.batches_failed,
            "process events"
        );

        report
    }

    async fn write_batch(&self, batch: &Batch, tag: &str, report: &mut FlushReport) {
        match self.writer.write(batch).await {
            Ok(result) => {
                report.rows_written += result.rows_written;
                report.batches_written += 1;
                self.metrics.record_batch_written(result.rows_written as u64);
            }
            Err(e) => {
                error!(
                    instance_id = %self.id,
                    tag = %tag,
                    batch_id = %batch.id,
                    rows = batch.len(),
                    error = %e,
                    "Failed to write batch"
                );
                report.batches_failed += 1;
                report.errors.push(e);
                self.metrics.increment_failures(1);
            }
        }
    }

    /// Releases the connection pool.
    pub async fn shutdown(&self) -> Result<(), SinkError> {
        info!(instance_id = %self.id, "Shutting down sink instance");
        self.adapter
            .close()
            .await
            .map_err(|e| SinkError::Adapter(e.into()))
    }
}
