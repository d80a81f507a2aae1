use model::records::{batch::Batch, record::Record};
use std::time::{Duration, Instant};

/// Buffers records until the size or the linger threshold is reached.
///
/// There is no background timer: the linger trigger is only evaluated when the
/// caller asks, which in practice is right after each ingested record.
#[derive(Debug)]
pub struct BatchAccumulator {
    buffer: Vec<Record>,
    batch_size: usize,
    linger: Duration,
    last_flush: Instant,
}

impl BatchAccumulator {
    pub fn new(batch_size: usize, linger: Duration) -> Self {
        Self::started_at(batch_size, linger, Instant::now())
    }

    pub fn started_at(batch_size: usize, linger: Duration, now: Instant) -> Self {
        let batch_size = batch_size.max(1);
        BatchAccumulator {
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            linger,
            last_flush: now,
        }
    }

    pub fn ingest(&mut self, record: Record) {
        self.buffer.push(record);
    }

    pub fn should_flush(&self) -> bool {
        self.should_flush_at(Instant::now())
    }

    pub fn should_flush_at(&self, now: Instant) -> bool {
        self.buffer.len() >= self.batch_size
            || now.saturating_duration_since(self.last_flush) >= self.linger
    }

    /// Hands off the buffered records and restarts the linger timer.
    pub fn drain(&mut self) -> Batch {
        self.drain_at(Instant::now())
    }

    pub fn drain_at(&mut self, now: Instant) -> Batch {
        let records = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        self.last_flush = now;
        Batch::new(records)
    }

    /// End of stream: the remaining records, if any, regardless of triggers.
    pub fn finish(&mut self) -> Option<Batch> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.drain())
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: i64) -> Record {
        Record::new().with("id", i)
    }

    #[test]
    fn test_size_trigger() {
        let start = Instant::now();
        let mut acc = BatchAccumulator::started_at(3, Duration::from_secs(60), start);

        for i in 0..2 {
            acc.ingest(record(i));
            assert!(!acc.should_flush_at(start));
        }
        acc.ingest(record(2));
        assert!(acc.should_flush_at(start));

        let batch = acc.drain_at(start);
        assert_eq!(batch.len(), 3);
        assert!(acc.is_empty());
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_linger_trigger_with_single_record() {
        let start = Instant::now();
        let linger = Duration::from_millis(500);
        let mut acc = BatchAccumulator::started_at(100, linger, start);

        acc.ingest(record(1));
        assert!(!acc.should_flush_at(start + Duration::from_millis(499)));
        assert!(acc.should_flush_at(start + linger));
    }

    #[test]
    fn test_drain_resets_timer() {
        let start = Instant::now();
        let linger = Duration::from_secs(1);
        let mut acc = BatchAccumulator::started_at(100, linger, start);

        acc.ingest(record(1));
        let later = start + Duration::from_secs(2);
        assert!(acc.should_flush_at(later));
        acc.drain_at(later);

        acc.ingest(record(2));
        assert!(!acc.should_flush_at(later + Duration::from_millis(10)));
    }

    #[test]
    fn test_finish_returns_undersized_remainder() {
        let mut acc = BatchAccumulator::new(10, Duration::from_secs(60));
        acc.ingest(record(1));
        acc.ingest(record(2));
        assert!(!acc.should_flush());

        let batch = acc.finish().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[1].get("id"), Some(&model::core::value::Value::Int(2)));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let mut acc = BatchAccumulator::new(0, Duration::from_secs(60));
        acc.ingest(record(1));
        assert!(acc.should_flush());
    }
}
