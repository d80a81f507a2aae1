use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// One decoded log event: an unordered set of fields of unknown shape.
///
/// No field is required; looking up a column that the event does not carry
/// yields `None` and is bound as SQL NULL downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(Value, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Sets a field, replacing any previous value stored under the same key.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up a field by column name. Text and UTF-8 byte keys both match.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k.matches_key(name))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.fields.iter()
    }

    /// Converts a decoded JSON object into a record. Non-object input is
    /// rejected with the kind of value that was found.
    pub fn from_json(json: serde_json::Value) -> Result<Self, &'static str> {
        match Value::from_json(json) {
            Value::Map(entries) => Ok(entries.into_iter().collect()),
            other => Err(other.kind()),
        }
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut record = Record::new().with("level", "info");
        record.insert("level", "warn");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("level"), Some(&Value::from("warn")));
    }

    #[test]
    fn test_missing_field() {
        let record = Record::new().with("id", 7i64);
        assert!(record.get("name").is_none());
    }

    #[test]
    fn test_byte_keys_are_addressable() {
        let record = Record::new().with(b"message".to_vec(), "hello");
        assert_eq!(record.get("message"), Some(&Value::from("hello")));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert_eq!(Record::from_json(json!([1, 2])), Err("array"));
        let record = Record::from_json(json!({"id": 1, "tags": ["a"]})).unwrap();
        assert_eq!(record.get("id"), Some(&Value::Int(1)));
    }
}
