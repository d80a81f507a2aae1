use crate::error::SinkError;
use connectors::sql::base::{
    adapter::SqlAdapter,
    dialect::{Dialect, MySql},
    metadata::column::ColumnMetadata,
    query::insert::Insert,
};
use model::core::data_type::TypeCategory;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub category: TypeCategory,
    /// Type as reported by the store, e.g. `varchar(255)`.
    pub column_type: String,
}

/// Writable columns of the target table, in declaration order, and the
/// INSERT statement whose placeholders follow that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSchema>,
    pub insert_sql: String,
}

impl TableSchema {
    /// Introspects `table`: a liveness check first, then the column listing.
    pub async fn discover(
        adapter: &dyn SqlAdapter,
        table: &str,
        ignore_columns: &[String],
    ) -> Result<Self, SinkError> {
        adapter.ping().await.map_err(SinkError::Connectivity)?;

        let columns =
            adapter
                .describe_columns(table)
                .await
                .map_err(|e| SinkError::SchemaDiscovery {
                    table: table.to_string(),
                    reason: e.to_string(),
                })?;

        let schema = Self::from_columns(table, &columns, ignore_columns, &MySql)?;

        info!(
            table = %schema.table,
            columns = schema.columns.len(),
            ignored = columns.len() - schema.columns.len(),
            "Discovered table schema"
        );

        Ok(schema)
    }

    /// Builds the schema from already fetched column metadata. Columns named
    /// in `ignore_columns` (exact, case-sensitive match) are dropped.
    pub fn from_columns(
        table: &str,
        columns: &[ColumnMetadata],
        ignore_columns: &[String],
        dialect: &dyn Dialect,
    ) -> Result<Self, SinkError> {
        let mut ordered = columns.to_vec();
        ordered.sort_by_key(|c| c.ordinal);

        let columns: Vec<ColumnSchema> = ordered
            .into_iter()
            .filter(|c| {
                let ignored = ignore_columns.contains(&c.name);
                if ignored {
                    debug!(column = %c.name, "Skipping ignored column");
                }
                !ignored
            })
            .map(|c| ColumnSchema {
                category: TypeCategory::from_column_type(&c.column_type),
                name: c.name,
                column_type: c.column_type,
            })
            .collect();

        if columns.is_empty() {
            return Err(SinkError::SchemaDiscovery {
                table: table.to_string(),
                reason: "no writable columns".to_string(),
            });
        }

        let names = columns.iter().map(|c| c.name.clone()).collect();
        let insert_sql = Insert::new(table, names)
            .render(dialect)
            .map_err(|e| SinkError::SchemaDiscovery {
                table: table.to_string(),
                reason: e.to_string(),
            })?;

        Ok(TableSchema {
            table: table.to_string(),
            columns,
            insert_sql,
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(ordinal: usize, name: &str, column_type: &str) -> ColumnMetadata {
        ColumnMetadata {
            ordinal,
            name: name.to_string(),
            column_type: column_type.to_string(),
            is_nullable: true,
            is_primary_key: false,
            default_value: None,
        }
    }

    fn columns() -> Vec<ColumnMetadata> {
        vec![
            column(0, "id", "int(11)"),
            column(1, "name", "varchar(255)"),
            column(2, "payload", "longblob"),
            column(3, "created_at", "datetime"),
        ]
    }

    #[test]
    fn test_classification_and_order() {
        let schema = TableSchema::from_columns("t", &columns(), &[], &MySql).unwrap();
        assert_eq!(schema.column_names(), vec!["id", "name", "payload", "created_at"]);
        let categories: Vec<_> = schema.columns.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                TypeCategory::Other,
                TypeCategory::TextLike,
                TypeCategory::TextLike,
                TypeCategory::Other
            ]
        );
        assert_eq!(
            schema.insert_sql,
            "INSERT INTO `t` (`id`, `name`, `payload`, `created_at`) VALUES (?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_ignored_columns_are_exact_matches() {
        let ignore = vec!["created_at".to_string(), "NAME".to_string()];
        let schema = TableSchema::from_columns("t", &columns(), &ignore, &MySql).unwrap();
        assert_eq!(schema.column_names(), vec!["id", "name", "payload"]);
        assert_eq!(
            schema.insert_sql,
            "INSERT INTO `t` (`id`, `name`, `payload`) VALUES (?, ?, ?)"
        );
    }

    #[test]
    fn test_declaration_order_wins_over_listing_order() {
        let mut shuffled = columns();
        shuffled.reverse();
        let schema = TableSchema::from_columns("t", &shuffled, &[], &MySql).unwrap();
        assert_eq!(schema.column_names(), vec!["id", "name", "payload", "created_at"]);
    }

    #[test]
    fn test_all_columns_ignored() {
        let ignore = vec!["id".to_string()];
        let err =
            TableSchema::from_columns("t", &[column(0, "id", "int")], &ignore, &MySql).unwrap_err();
        assert!(matches!(err, SinkError::SchemaDiscovery { reason, .. } if reason == "no writable columns"));
    }

    #[test]
    fn test_qualified_table() {
        let schema =
            TableSchema::from_columns("logs.events", &[column(0, "msg", "text")], &[], &MySql)
                .unwrap();
        assert_eq!(schema.insert_sql, "INSERT INTO `logs`.`events` (`msg`) VALUES (?)");
    }
}
