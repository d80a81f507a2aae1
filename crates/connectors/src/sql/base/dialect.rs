//! Defines the `Dialect` trait for database-specific SQL syntax.

use crate::sql::base::error::DbError;

pub trait Dialect: Send + Sync {
    /// Wraps a single identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> Result<String, DbError>;

    /// Quotes a possibly schema-qualified name (`db.table`), part by part.
    fn quote_qualified(&self, name: &str) -> Result<String, DbError> {
        let parts = name
            .split('.')
            .map(|part| self.quote_identifier(part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join("."))
    }

    /// Returns the placeholder for a parameterized query.
    ///
    /// - MySQL uses `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the name of the dialect (e.g., "MySQL").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> Result<String, DbError> {
        if ident.is_empty() || ident.contains('\0') {
            return Err(DbError::InvalidIdentifier(ident.to_string()));
        }
        Ok(format!("`{}`", ident.replace('`', "``")))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn name(&self) -> String {
        "MySQL".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(MySql.quote_identifier("name").unwrap(), "`name`");
        assert_eq!(MySql.quote_identifier("we`ird").unwrap(), "`we``ird`");
        assert!(MySql.quote_identifier("").is_err());
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(MySql.quote_qualified("logs.events").unwrap(), "`logs`.`events`");
        assert_eq!(MySql.quote_qualified("events").unwrap(), "`events`");
        assert!(MySql.quote_qualified("logs.").is_err());
    }
}
