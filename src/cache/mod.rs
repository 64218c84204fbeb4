//! Cache Module
//!
//! Provides the immutable value type, the byte-budgeted LRU and the
//! thread-safe store each group keeps its entries in.

mod lru;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use lru::{LruCache, OnEvicted};
pub use stats::CacheStats;
pub use store::{CacheStore, EvictionHook};
pub use value::Value;
