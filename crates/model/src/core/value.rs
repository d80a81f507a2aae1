use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, hash::Hash};

/// A loosely-typed field value as produced by the record decoder.
///
/// Scalars, raw byte payloads and nested containers are all represented here so
/// that every pass over a record is a structural match instead of a runtime
/// type check. Map entries keep their decoded order; keys are values too since
/// the wire format does not restrict them to strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use Value::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Null => {}
            Boolean(v) => v.hash(state),
            Int(v) => v.hash(state),
            Uint(v) => v.hash(state),
            // Hash the bits of the float to handle NaN and -0.0 consistently
            Float(v) => v.to_bits().hash(state),
            String(v) => v.hash(state),
            Bytes(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
            Array(items) => items.hash(state),
            Map(entries) => entries.hash(state),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Mappings and sequences.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Looks up a map entry by textual key. Returns `None` for non-map values.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.matches_key(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// True when this value, used as a key, names `key`.
    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            Value::String(s) => s == key,
            Value::Bytes(b) => b.as_slice() == key.as_bytes(),
            _ => false,
        }
    }

    /// Builds a value from decoded JSON. Objects keep their key order as
    /// yielded by `serde_json` and become `Map`s with `String` keys.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => {
                let hex = v
                    .iter()
                    .fold(String::new(), |acc, byte: &u8| acc + &format!("{byte:02x}"));
                write!(f, "0x{hex}")
            }
            Value::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
            Value::Array(items) => write!(f, "[{} items]", items.len()),
            Value::Map(entries) => write!(f, "{{{} entries}}", entries.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_nested() {
        let value = Value::from_json(json!({"a": [1, "x", null], "b": {"c": true}}));
        let a = value.get("a").unwrap();
        assert_eq!(
            a,
            &Value::Array(vec![Value::Int(1), Value::from("x"), Value::Null])
        );
        assert_eq!(value.get("b").unwrap().get("c"), Some(&Value::Boolean(true)));
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_bytes_key_matches_text() {
        let map = Value::Map(vec![(Value::Bytes(b"log".to_vec()), Value::Int(1))]);
        assert_eq!(map.get("log"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_composite_detection() {
        assert!(Value::Array(vec![]).is_composite());
        assert!(Value::Map(vec![]).is_composite());
        assert!(!Value::Bytes(vec![1]).is_composite());
        assert!(!Value::Null.is_composite());
    }

    #[test]
    fn test_large_unsigned_json_number() {
        let value = Value::from_json(json!(u64::MAX));
        assert_eq!(value, Value::Uint(u64::MAX));
    }
}
