use crate::{
    coerce::ValueCoercer, error::SinkError, metrics::Metrics, schema::catalog::TableSchema,
};
use connectors::sql::base::{adapter::SqlAdapter, transaction::SqlTransaction};
use model::{core::value::Value, records::batch::Batch};
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{error, info, warn};

/// Deadline covering one whole write: begin, prepare, rows and commit.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: tokio::time::Instant,
    limit: Duration,
}

#[derive(Debug, Clone)]
pub struct WriteResult {
    pub rows_written: usize,
    pub duration: Duration,
    /// Fields bound as NULL because they could not be coerced.
    pub fallbacks: usize,
}

/// Writes each batch as one all-or-nothing transaction through a single
/// prepared INSERT. There is no retry here; a failed batch is reported and
/// dropped.
pub struct TransactionalBatchWriter {
    adapter: Arc<dyn SqlAdapter>,
    schema: Arc<TableSchema>,
    coercer: ValueCoercer,
    timeout: Option<Duration>,
    metrics: Metrics,
}

impl TransactionalBatchWriter {
    pub fn new(adapter: Arc<dyn SqlAdapter>, schema: Arc<TableSchema>, coercer: ValueCoercer) -> Self {
        Self {
            adapter,
            schema,
            coercer,
            timeout: None,
            metrics: Metrics::new(),
        }
    }

    /// Bounds every write from `begin` through `commit`. Expiry during row
    /// execution rolls the transaction back explicitly; expiry during commit
    /// drops the transaction, which the driver rolls back on release.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub async fn write(&self, batch: &Batch) -> Result<WriteResult, SinkError> {
        let start = Instant::now();

        if batch.is_empty() {
            return Ok(WriteResult {
                rows_written: 0,
                duration: start.elapsed(),
                fallbacks: 0,
            });
        }

        info!(
            batch_id = %batch.id,
            row_count = batch.len(),
            table = %self.schema.table,
            "Writing batch to destination"
        );

        // Parameters are built up front so a coercion abort never leaves a
        // transaction open.
        let (rows, fallbacks) = self.bind_rows(batch)?;

        let deadline = self.timeout.map(|limit| Deadline {
            at: tokio::time::Instant::now() + limit,
            limit,
        });

        let begin = async {
            self.adapter.begin().await.map_err(|source| SinkError::Begin {
                batch_id: batch.id.clone(),
                source,
            })
        };
        let mut tx = within(deadline, &batch.id, begin).await?;

        let execution = Self::execute_rows(&mut *tx, &self.schema.insert_sql, rows, &batch.id);
        let outcome = within(deadline, &batch.id, execution).await;

        if let Err(err) = outcome {
            error!(batch_id = %batch.id, error = %err, "Batch failed, rolling back");
            if let Err(source) = tx.rollback().await {
                error!(batch_id = %batch.id, error = %source, "Rollback failed");
                return Err(SinkError::Rollback {
                    batch_id: batch.id.clone(),
                    source,
                });
            }
            return Err(err);
        }

        let commit = async {
            tx.commit().await.map_err(|source| SinkError::Commit {
                batch_id: batch.id.clone(),
                source,
            })
        };
        within(deadline, &batch.id, commit)
            .await
            .inspect_err(|err| error!(batch_id = %batch.id, error = %err, "Commit did not complete"))?;

        let duration = start.elapsed();
        let rows_written = batch.len();
        let rows_per_sec = rows_written as f64 / duration.as_secs_f64().max(f64::EPSILON);

        info!(
            batch_id = %batch.id,
            rows = rows_written,
            duration_ms = duration.as_millis(),
            rows_per_sec = %format!("{:.2}", rows_per_sec),
            "Batch written successfully"
        );

        Ok(WriteResult {
            rows_written,
            duration,
            fallbacks,
        })
    }

    fn bind_rows(&self, batch: &Batch) -> Result<(Vec<Vec<Value>>, usize), SinkError> {
        let mut rows = Vec::with_capacity(batch.len());
        let mut fallbacks = 0;

        for (idx, record) in batch.records.iter().enumerate() {
            let bound = self
                .coercer
                .bind(&self.schema.columns, record)
                .inspect_err(|err| {
                    error!(batch_id = %batch.id, row = idx + 1, error = %err, "Coercion failed, aborting batch")
                })?;

            for fallback in &bound.fallbacks {
                warn!(
                    batch_id = %batch.id,
                    row = idx + 1,
                    field = %fallback.field,
                    cause = %fallback.cause,
                    "Binding NULL for field that could not be coerced"
                );
            }

            fallbacks += bound.fallbacks.len();
            rows.push(bound.params);
        }

        if fallbacks > 0 {
            self.metrics.increment_fallbacks(fallbacks as u64);
        }

        Ok((rows, fallbacks))
    }

    /// Rows are numbered from 1 in errors.
    async fn execute_rows(
        tx: &mut dyn SqlTransaction,
        sql: &str,
        rows: Vec<Vec<Value>>,
        batch_id: &str,
    ) -> Result<(), SinkError> {
        let stmt = tx.prepare(sql).await.map_err(|source| SinkError::Prepare {
            batch_id: batch_id.to_string(),
            source,
        })?;

        for (idx, params) in rows.into_iter().enumerate() {
            tx.exec(&stmt, params)
                .await
                .map_err(|source| SinkError::RowExecution {
                    batch_id: batch_id.to_string(),
                    row: idx + 1,
                    source,
                })?;
        }

        Ok(())
    }
}

async fn within<T>(
    deadline: Option<Deadline>,
    batch_id: &str,
    step: impl Future<Output = Result<T, SinkError>>,
) -> Result<T, SinkError> {
    let Some(deadline) = deadline else {
        return step.await;
    };

    match tokio::time::timeout_at(deadline.at, step).await {
        Ok(result) => result,
        Err(_) => Err(SinkError::Timeout {
            batch_id: batch_id.to_string(),
            timeout_ms: deadline.limit.as_millis(),
        }),
    }
}
