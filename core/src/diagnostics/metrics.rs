use std::sync::Mutex;

/// Counters for the sync loop, readable while the loop runs.
pub struct SyncMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub requests: u64,
    pub applied: u64,
    pub failures: u64,
    pub stale: u64,
    pub selection_misses: u64,
    pub renders: u64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn with(&self, update: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            update(&mut metrics);
        }
    }

    pub fn record_tick(&self, requests: usize) {
        self.with(|m| {
            m.ticks += 1;
            m.requests += requests as u64;
        });
    }

    pub fn record_requests(&self, requests: usize) {
        self.with(|m| m.requests += requests as u64);
    }

    pub fn record_applied(&self) {
        self.with(|m| m.applied += 1);
    }

    pub fn record_failure(&self) {
        self.with(|m| m.failures += 1);
    }

    pub fn record_stale(&self) {
        self.with(|m| m.stale += 1);
    }

    pub fn record_selection_miss(&self) {
        self.with(|m| m.selection_misses += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_requests() {
        let metrics = SyncMetrics::new();
        metrics.record_tick(3);
        metrics.record_tick(2);
        metrics.record_requests(1);
        metrics.record_failure();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.requests, 6);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.applied, 0);
    }
}
