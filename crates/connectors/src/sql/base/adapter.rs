use crate::sql::base::{
    error::DbError, metadata::column::ColumnMetadata, transaction::SqlTransaction,
};
use async_trait::async_trait;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Other(String),
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseKind::MySql),
            "" => Err("empty dialect".to_string()),
            other => Ok(DatabaseKind::Other(other.to_string())),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::MySql => write!(f, "mysql"),
            DatabaseKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A pooled handle to the relational store.
///
/// Implementations must be cheap to share: every batch write asks for its own
/// transaction, which holds one pooled connection until commit or rollback.
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    /// Liveness check against the store.
    async fn ping(&self) -> Result<(), DbError>;

    /// Columns of `table` in declaration order.
    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>, DbError>;

    /// Opens a transaction on a connection taken from the pool.
    async fn begin(&self) -> Result<Box<dyn SqlTransaction>, DbError>;

    /// Releases pooled connections. The adapter must not be used afterwards.
    async fn close(&self) -> Result<(), DbError>;

    fn kind(&self) -> DatabaseKind;
}
