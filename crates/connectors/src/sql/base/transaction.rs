use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::core::value::Value;

/// Handle to a statement prepared inside a transaction.
#[derive(Debug, Clone)]
pub enum PreparedStatement {
    MySql(mysql_async::Statement),
    /// Plain statement text, for stores without server-side preparation.
    Text(String),
}

/// An open transaction. Dropping it without calling `commit` or `rollback`
/// leaves the outcome to the driver, so callers always finish explicitly.
#[async_trait]
pub trait SqlTransaction: Send {
    async fn prepare(&mut self, sql: &str) -> Result<PreparedStatement, DbError>;

    /// Executes `stmt` with positional parameters.
    async fn exec(&mut self, stmt: &PreparedStatement, params: Vec<Value>) -> Result<(), DbError>;

    async fn commit(self: Box<Self>) -> Result<(), DbError>;

    async fn rollback(self: Box<Self>) -> Result<(), DbError>;
}
