//! Storage Statistics Module
//!
//! Tracks read outcomes, lazy expirations, and absorbed failures.

use serde::Serialize;

// == Storage Stats ==
/// Counters kept by a [`crate::storage::Storage`] instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing usable (absent, expired, or corrupted)
    pub misses: u64,
    /// Entries deleted because they were found expired
    pub expirations: u64,
    /// Operations that failed and were converted to a failure result
    pub failures: u64,
}

impl StorageStats {
    // == Constructor ==
    /// Creates a new StorageStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the read hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}
