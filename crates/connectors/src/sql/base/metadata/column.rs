use serde::{Deserialize, Serialize};

/// One column as reported by the store's introspection query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub ordinal: usize,
    pub name: String,
    /// Declared type exactly as reported, e.g. `varchar(255)`.
    pub column_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub default_value: Option<String>,
}
