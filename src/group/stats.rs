//! Group Statistics Module
//!
//! Lock-free counters describing how a group answered its lookups.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Group Stats ==
/// Per-group counters, updated from many tasks at once.
#[derive(Debug, Default)]
pub struct GroupStats {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    loads: AtomicU64,
    loads_deduped: AtomicU64,
    local_loads: AtomicU64,
    local_load_errs: AtomicU64,
    server_requests: AtomicU64,
}

/// Point-in-time copy of [`GroupStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStatsSnapshot {
    /// Lookups of any kind
    pub gets: u64,
    /// Lookups answered from the local store
    pub cache_hits: u64,
    /// Values fetched from a remote peer
    pub peer_loads: u64,
    /// Failed peer fetches (answered by the loader instead)
    pub peer_errors: u64,
    /// Misses that went through the single-flight gate
    pub loads: u64,
    /// Loads actually executed after coalescing
    pub loads_deduped: u64,
    /// Successful loader calls
    pub local_loads: u64,
    /// Failed loader calls
    pub local_load_errs: u64,
    /// Requests received from peers
    pub server_requests: u64,
}

macro_rules! counters {
    ($($name:ident => $record:ident),* $(,)?) => {
        impl GroupStats {
            $(
                #[doc = concat!("Increments `", stringify!($name), "`.")]
                pub fn $record(&self) {
                    self.$name.fetch_add(1, Ordering::Relaxed);
                }
            )*

            /// Returns a copy of the current counters.
            pub fn snapshot(&self) -> GroupStatsSnapshot {
                GroupStatsSnapshot {
                    $($name: self.$name.load(Ordering::Relaxed),)*
                }
            }
        }
    };
}

counters! {
    gets => record_get,
    cache_hits => record_cache_hit,
    peer_loads => record_peer_load,
    peer_errors => record_peer_error,
    loads => record_load,
    loads_deduped => record_load_deduped,
    local_loads => record_local_load,
    local_load_errs => record_local_load_err,
    server_requests => record_server_request,
}
