use crate::sql::base::{error::DbError, metadata::column::ColumnMetadata};
use mysql_async::Row as MySqlRow;

pub trait ColumnMetadataMapper {
    fn from_show_columns_row(ordinal: usize, row: &MySqlRow) -> Result<ColumnMetadata, DbError>;
}

impl ColumnMetadataMapper for ColumnMetadata {
    /// Maps one row of `SHOW COLUMNS` (`Field`, `Type`, `Null`, `Key`, `Default`, `Extra`).
    fn from_show_columns_row(ordinal: usize, row: &MySqlRow) -> Result<ColumnMetadata, DbError> {
        let name = text_column(row, "Field")?.ok_or_else(|| DbError::MissingColumn("Field".into()))?;
        let column_type =
            text_column(row, "Type")?.ok_or_else(|| DbError::MissingColumn("Type".into()))?;
        let is_nullable = text_column(row, "Null")?.is_some_and(|v| v.eq_ignore_ascii_case("YES"));
        let is_primary_key = text_column(row, "Key")?.is_some_and(|v| v == "PRI");
        let default_value = text_column(row, "Default")?;

        Ok(ColumnMetadata {
            ordinal,
            name,
            column_type,
            is_nullable,
            is_primary_key,
            default_value,
        })
    }
}

/// Reads a column as raw bytes and decodes it; some servers report these
/// columns as BLOBs rather than strings. SQL NULL maps to `None`.
fn text_column(row: &MySqlRow, name: &str) -> Result<Option<String>, DbError> {
    match row.get_opt::<Option<Vec<u8>>, _>(name) {
        Some(Ok(Some(raw))) => Ok(Some(String::from_utf8(raw)?)),
        Some(Ok(None)) | None => Ok(None),
        Some(Err(err)) => Err(DbError::Unknown(format!(
            "cannot read column '{name}' from SHOW COLUMNS: {err}"
        ))),
    }
}
