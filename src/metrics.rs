//! Operation counters for transfer operations.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector shared by all operations of one transfer manager
#[derive(Debug, Clone, Default)]
pub struct TransferMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    operation_counts: DashMap<String, AtomicU64>,
    error_counts: DashMap<String, AtomicU64>,
    bytes_uploaded: AtomicU64,
    bytes_downloaded: AtomicU64,
}

impl TransferMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&self, operation: &str) {
        self.inner
            .operation_counts
            .entry(operation.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, operation: &str) {
        self.inner
            .error_counts
            .entry(operation.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes_uploaded(&self, bytes: u64) {
        self.inner.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_bytes_downloaded(&self, bytes: u64) {
        self.inner
            .bytes_downloaded
            .fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn operation_count(&self, operation: &str) -> u64 {
        self.inner
            .operation_counts
            .get(operation)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn error_count(&self, operation: &str) -> u64 {
        self.inner
            .error_counts
            .get(operation)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn bytes_uploaded(&self) -> u64 {
        self.inner.bytes_uploaded.load(Ordering::Relaxed)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.inner.bytes_downloaded.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_per_operation() {
        let metrics = TransferMetrics::new();
        metrics.record_operation("upload");
        metrics.record_operation("upload");
        metrics.record_operation("list");
        metrics.record_error("upload");

        assert_eq!(metrics.operation_count("upload"), 2);
        assert_eq!(metrics.operation_count("list"), 1);
        assert_eq!(metrics.operation_count("download"), 0);
        assert_eq!(metrics.error_count("upload"), 1);
    }

    #[test]
    fn byte_counters_accumulate() {
        let metrics = TransferMetrics::new();
        metrics.record_bytes_uploaded(100);
        metrics.record_bytes_uploaded(28);
        metrics.record_bytes_downloaded(7);

        assert_eq!(metrics.bytes_uploaded(), 128);
        assert_eq!(metrics.bytes_downloaded(), 7);
    }

    #[test]
    fn clones_share_the_same_counters() {
        let metrics = TransferMetrics::new();
        let clone = metrics.clone();
        clone.record_operation("move");
        assert_eq!(metrics.operation_count("move"), 1);
    }
}
