//! Cache Store Module
//!
//! Thread-safe wrapper around the byte-budgeted LRU, one per group.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{CacheStats, LruCache, Value};

/// Eviction notification shared with the store's owner.
pub type EvictionHook = Arc<dyn Fn(&str, &Value) + Send + Sync>;

#[derive(Debug)]
struct StoreInner {
    lru: LruCache,
    stats: CacheStats,
}

// == Cache Store ==
/// Local store for one group.
///
/// Every operation, reads included (they reorder the LRU), runs under one
/// exclusive lock. The eviction hook runs after that lock is released, so it
/// may call back into the store.
pub struct CacheStore {
    inner: Mutex<StoreInner>,
    on_evicted: Option<EvictionHook>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store bounded to `max_bytes`.
    ///
    /// # Arguments
    /// * `max_bytes` - Byte budget for keys plus values; zero disables caching
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                lru: LruCache::new(max_bytes, None),
                stats: CacheStats::new(),
            }),
            on_evicted: None,
        }
    }

    /// Creates a store that reports every eviction to `hook`.
    pub fn with_eviction_hook(max_bytes: usize, hook: EvictionHook) -> Self {
        Self {
            on_evicted: Some(hook),
            ..Self::new(max_bytes)
        }
    }

    // == Get ==
    /// Retrieves a value by key, refreshing its recency on a hit.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock();
        let value = inner.lru.get(key);
        inner.stats.record_get(value.is_some());
        value
    }

    // == Add ==
    /// Stores a value, evicting least recently used entries as needed.
    pub fn add(&self, key: &str, value: Value) {
        let evicted = {
            let mut inner = self.inner.lock();
            let evicted = inner.lru.add_collect(key, value);
            inner.stats.record_evictions(evicted.len());
            evicted
        };

        if let Some(hook) = &self.on_evicted {
            for (key, value) in &evicted {
                hook(key, value);
            }
        }
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.bytes = inner.lru.used_bytes();
        stats.items = inner.lru.len();
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("inner", &*self.inner.lock())
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}
