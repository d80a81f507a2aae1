use crate::records::record::Record;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An ordered group of records handed to the writer as one transaction.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: String,
    pub records: Vec<Record>,
    pub ts: DateTime<Utc>,
}

impl Batch {
    pub fn new(records: Vec<Record>) -> Self {
        Batch {
            id: Uuid::new_v4().simple().to_string(),
            records,
            ts: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
