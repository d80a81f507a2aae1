//! An in-memory transactional table implementing the adapter traits, with
//! failure injection for every step of the write path.

use async_trait::async_trait;
use connectors::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::DbError,
        metadata::column::ColumnMetadata,
        transaction::{PreparedStatement, SqlTransaction},
    },
    mysql::params::MySqlParamStore,
};
use model::core::value::Value;
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    Begin,
    Prepare(String),
    Exec,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub ping: bool,
    pub describe: bool,
    pub begin: bool,
    /// 1-based row within a transaction whose execution fails.
    pub row: Option<usize>,
    pub commit: bool,
    pub rollback: bool,
    /// Sleep before handing out a transaction.
    pub begin_delay: Option<Duration>,
    /// Sleep before every row execution.
    pub exec_delay: Option<Duration>,
    /// Sleep inside commit, before staged rows become visible.
    pub commit_delay: Option<Duration>,
    /// Panic inside row execution.
    pub panic: bool,
}

#[derive(Default)]
struct Inner {
    columns: Vec<ColumnMetadata>,
    rows: Mutex<Vec<Vec<Value>>>,
    failures: Mutex<Failures>,
    events: Mutex<Vec<TxEvent>>,
    closed: Mutex<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
pub struct MemoryAdapter {
    inner: Arc<Inner>,
}

impl MemoryAdapter {
    /// A table with the given `(name, type)` columns in declaration order.
    pub fn new(columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(ordinal, (name, column_type))| ColumnMetadata {
                ordinal,
                name: name.to_string(),
                column_type: column_type.to_string(),
                is_nullable: true,
                is_primary_key: false,
                default_value: None,
            })
            .collect();

        MemoryAdapter {
            inner: Arc::new(Inner {
                columns,
                ..Inner::default()
            }),
        }
    }

    pub fn with_failures(self, failures: Failures) -> Self {
        self.set_failures(failures);
        self
    }

    pub fn set_failures(&self, failures: Failures) {
        *lock(&self.inner.failures) = failures;
    }

    fn failures(&self) -> Failures {
        lock(&self.inner.failures).clone()
    }

    /// Committed rows, in insertion order.
    pub fn rows(&self) -> Vec<Vec<Value>> {
        lock(&self.inner.rows).clone()
    }

    pub fn events(&self) -> Vec<TxEvent> {
        lock(&self.inner.events).clone()
    }

    pub fn is_closed(&self) -> bool {
        *lock(&self.inner.closed)
    }

    fn record(&self, event: TxEvent) {
        lock(&self.inner.events).push(event);
    }
}

#[async_trait]
impl SqlAdapter for MemoryAdapter {
    async fn ping(&self) -> Result<(), DbError> {
        if self.failures().ping {
            return Err(DbError::Unknown("connection refused".into()));
        }
        Ok(())
    }

    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>, DbError> {
        if self.failures().describe {
            return Err(DbError::Unknown(format!("Table '{table}' doesn't exist")));
        }
        Ok(self.inner.columns.clone())
    }

    async fn begin(&self) -> Result<Box<dyn SqlTransaction>, DbError> {
        let failures = self.failures();
        if let Some(delay) = failures.begin_delay {
            tokio::time::sleep(delay).await;
        }
        if failures.begin {
            return Err(DbError::Unknown("too many connections".into()));
        }
        self.record(TxEvent::Begin);
        Ok(Box::new(MemoryTransaction {
            adapter: self.clone(),
            staged: Vec::new(),
        }))
    }

    async fn close(&self) -> Result<(), DbError> {
        *lock(&self.inner.closed) = true;
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Other("memory".into())
    }
}

pub struct MemoryTransaction {
    adapter: MemoryAdapter,
    staged: Vec<Vec<Value>>,
}

#[async_trait]
impl SqlTransaction for MemoryTransaction {
    async fn prepare(&mut self, sql: &str) -> Result<PreparedStatement, DbError> {
        self.adapter.record(TxEvent::Prepare(sql.to_string()));
        Ok(PreparedStatement::Text(sql.to_string()))
    }

    async fn exec(&mut self, stmt: &PreparedStatement, params: Vec<Value>) -> Result<(), DbError> {
        let PreparedStatement::Text(sql) = stmt else {
            return Err(DbError::ForeignStatement);
        };

        let failures = self.adapter.failures();
        if let Some(delay) = failures.exec_delay {
            tokio::time::sleep(delay).await;
        }

        if failures.panic {
            panic!("driver bug");
        }

        self.adapter.record(TxEvent::Exec);
        let row = self.staged.len() + 1;

        if failures.row == Some(row) {
            return Err(DbError::Unknown(format!("Duplicate entry for row {row}")));
        }

        let placeholders = sql.matches('?').count();
        if placeholders != params.len() {
            return Err(DbError::Unknown(format!(
                "expected {placeholders} parameters, got {}",
                params.len()
            )));
        }

        // Same shape checks as the real driver binding.
        MySqlParamStore::from_values(&params)?;

        self.staged.push(params);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        let MemoryTransaction { adapter, staged } = *self;
        adapter.record(TxEvent::Commit);
        let failures = adapter.failures();
        if let Some(delay) = failures.commit_delay {
            tokio::time::sleep(delay).await;
        }
        if failures.commit {
            return Err(DbError::Unknown("deadlock found when trying to commit".into()));
        }
        lock(&adapter.inner.rows).extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        self.adapter.record(TxEvent::Rollback);
        if self.adapter.failures().rollback {
            return Err(DbError::Unknown("connection lost during rollback".into()));
        }
        Ok(())
    }
}
