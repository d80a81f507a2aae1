use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

/// Coarse classification of a destination column.
///
/// Only the distinction between character/blob columns and everything else
/// matters for binding: text-like columns receive nested values serialized to
/// JSON text, all other columns get values as they are.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    TextLike,
    Other,
}

lazy_static! {
    static ref TEXT_LIKE_TYPES: HashSet<&'static str> = [
        "varchar",
        "tinytext",
        "mediumtext",
        "longtext",
        "text",
        "tinyblob",
        "mediumblob",
        "longblob",
        "blob",
    ]
    .into_iter()
    .collect();
}

impl TypeCategory {
    /// Classifies a column from the type string reported by the store, e.g.
    /// `varchar(255)`, `int(11) unsigned` or `longtext`.
    ///
    /// The match is case-sensitive on the leading type keyword.
    pub fn from_column_type(column_type: &str) -> Self {
        if TEXT_LIKE_TYPES.contains(base_type_name(column_type)) {
            TypeCategory::TextLike
        } else {
            TypeCategory::Other
        }
    }

    pub fn is_text_like(&self) -> bool {
        matches!(self, TypeCategory::TextLike)
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCategory::TextLike => write!(f, "text-like"),
            TypeCategory::Other => write!(f, "other"),
        }
    }
}

/// Returns the first word token (`[A-Za-z0-9_]+`) of a column type string.
pub fn base_type_name(column_type: &str) -> &str {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let start = match column_type.find(is_word) {
        Some(idx) => idx,
        None => return "",
    };
    let rest = &column_type[start..];
    let end = rest.find(|c: char| !is_word(c)).unwrap_or(rest.len());
    &rest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type_name() {
        assert_eq!(base_type_name("varchar(255)"), "varchar");
        assert_eq!(base_type_name("int(11) unsigned"), "int");
        assert_eq!(base_type_name("longtext"), "longtext");
        assert_eq!(base_type_name("  datetime(6)"), "datetime");
        assert_eq!(base_type_name("()"), "");
    }

    #[test]
    fn test_text_like_types() {
        for ty in [
            "varchar(64)",
            "tinytext",
            "mediumtext",
            "longtext",
            "text",
            "tinyblob",
            "mediumblob",
            "longblob",
            "blob",
        ] {
            assert_eq!(TypeCategory::from_column_type(ty), TypeCategory::TextLike, "{ty}");
        }
    }

    #[test]
    fn test_other_types() {
        for ty in ["int(11)", "bigint unsigned", "datetime", "json", "char(3)", "decimal(10,2)"] {
            assert_eq!(TypeCategory::from_column_type(ty), TypeCategory::Other, "{ty}");
        }
    }

    #[test]
    fn test_classification_is_case_sensitive() {
        assert_eq!(TypeCategory::from_column_type("VARCHAR(10)"), TypeCategory::Other);
        assert_eq!(TypeCategory::from_column_type("Text"), TypeCategory::Other);
    }
}
