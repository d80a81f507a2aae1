//! Rendering of the single-row parameterized INSERT used for batch writes.

use crate::sql::base::{dialect::Dialect, error::DbError};

/// `INSERT INTO table (c1, c2, ...) VALUES (?, ?, ...)`, one placeholder per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
}

impl Insert {
    pub fn new(table: &str, columns: Vec<String>) -> Self {
        Insert {
            table: table.to_string(),
            columns,
        }
    }

    pub fn render(&self, dialect: &dyn Dialect) -> Result<String, DbError> {
        let mut sql = String::from("INSERT INTO ");
        sql.push_str(&dialect.quote_qualified(&self.table)?);
        sql.push_str(" (");

        let quoted_columns = self
            .columns
            .iter()
            .map(|c| dialect.quote_identifier(c))
            .collect::<Result<Vec<_>, _>>()?;
        sql.push_str(&quoted_columns.join(", "));
        sql.push_str(") VALUES (");

        let placeholders = (0..self.columns.len())
            .map(|i| dialect.get_placeholder(i))
            .collect::<Vec<_>>();
        sql.push_str(&placeholders.join(", "));
        sql.push(')');

        Ok(sql)
    }
}
