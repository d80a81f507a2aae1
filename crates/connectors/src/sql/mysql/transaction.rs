use crate::sql::{
    base::{
        error::DbError,
        transaction::{PreparedStatement, SqlTransaction},
    },
    mysql::params::MySqlParamStore,
};
use async_trait::async_trait;
use model::core::value::Value;
use mysql_async::{Transaction, prelude::Queryable};

/// A MySQL transaction owning its pooled connection for its whole lifetime.
pub struct MySqlTransaction {
    tx: Transaction<'static>,
}

impl MySqlTransaction {
    pub fn new(tx: Transaction<'static>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl SqlTransaction for MySqlTransaction {
    async fn prepare(&mut self, sql: &str) -> Result<PreparedStatement, DbError> {
        let stmt = self.tx.prep(sql).await?;
        Ok(PreparedStatement::MySql(stmt))
    }

    async fn exec(&mut self, stmt: &PreparedStatement, params: Vec<Value>) -> Result<(), DbError> {
        let stmt = match stmt {
            PreparedStatement::MySql(stmt) => stmt.clone(),
            PreparedStatement::Text(_) => return Err(DbError::ForeignStatement),
        };
        let bindings = MySqlParamStore::from_values(&params)?;
        self.tx.exec_drop(stmt, bindings.params()).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
