//! Cache Statistics Module
//!
//! Tracks local store metrics including hits, lookups and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of a store's performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Bytes currently held (keys plus values)
    pub bytes: usize,
    /// Current number of entries in the store
    pub items: usize,
    /// Number of lookups
    pub gets: u64,
    /// Number of lookups answered from the store
    pub hits: u64,
    /// Number of entries evicted due to byte pressure
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / gets, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }

    // == Record Lookup ==
    /// Counts one lookup, and one hit if it was answered.
    pub fn record_get(&mut self, hit: bool) {
        self.gets += 1;
        if hit {
            self.hits += 1;
        }
    }

    // == Record Evictions ==
    /// Adds `count` to the eviction counter.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }
}
