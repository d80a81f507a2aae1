use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_processed: AtomicU64,
    records_written: AtomicU64,
    batches_written: AtomicU64,
    batches_failed: AtomicU64,
    coercion_fallbacks: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_processed: u64,
    pub records_written: u64,
    pub batches_written: u64,
    pub batches_failed: u64,
    pub coercion_fallbacks: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_records(&self, count: u64) {
        self.inner
            .records_processed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_batch_written(&self, rows: u64) {
        self.inner.batches_written.fetch_add(1, Ordering::Relaxed);
        self.inner.records_written.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_failures(&self, count: u64) {
        self.inner.batches_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_fallbacks(&self, count: u64) {
        self.inner
            .coercion_fallbacks
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_processed: self.inner.records_processed.load(Ordering::Relaxed),
            records_written: self.inner.records_written.load(Ordering::Relaxed),
            batches_written: self.inner.batches_written.load(Ordering::Relaxed),
            batches_failed: self.inner.batches_failed.load(Ordering::Relaxed),
            coercion_fallbacks: self.inner.coercion_fallbacks.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        clone.increment_records(5);
        clone.record_batch_written(5);
        metrics.increment_failures(1);
        metrics.increment_fallbacks(2);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                records_processed: 5,
                records_written: 5,
                batches_written: 1,
                batches_failed: 1,
                coercion_fallbacks: 2,
            }
        );
    }
}
