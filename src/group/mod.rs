//! Group Module
//!
//! A group is one named cache namespace: its own loader, local store, peer
//! picker and single-flight gate. Lookups go local store → owning peer →
//! loader, and every successful load populates the local store.

mod getter;
mod registry;
mod stats;

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, Value};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::FlightGroup;

pub use getter::{getter_fn, Getter, GetterFn};
pub use registry::GroupRegistry;
pub use stats::{GroupStats, GroupStatsSnapshot};

// == Group ==
/// A named, read-through cache namespace.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: FlightGroup<Result<Value>>,
    load_timeout: Option<Duration>,
    stats: GroupStats,
}

impl Group {
    // == Constructor ==
    /// Creates a group. Register it with a [`GroupRegistry`] to make it
    /// reachable by peers.
    ///
    /// # Arguments
    /// * `name` - Namespace name, unique per registry
    /// * `cache_bytes` - Byte budget of the local store
    /// * `getter` - Loader consulted when neither the store nor a peer has the key
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: impl Getter + 'static) -> Self {
        Self {
            name: name.into(),
            getter: Arc::new(getter),
            main_cache: CacheStore::new(cache_bytes),
            peers: OnceLock::new(),
            loader: FlightGroup::new(),
            load_timeout: None,
            stats: GroupStats::default(),
        }
    }

    /// Bounds each coalesced load (peer fetch plus local fallback).
    ///
    /// Every caller waiting on a load that overruns gets [`CacheError::Timeout`].
    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Installs the peer picker used to find each key's owner.
    ///
    /// A group keeps one picker for its lifetime; a second registration is a
    /// [`CacheError::Config`] error.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Config(format!(
                "peer picker already registered for group {}",
                self.name
            ))
        })
    }

    // == Get ==
    /// Looks up `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<Value> {
        self.stats.record_get();
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key) {
            self.stats.record_cache_hit();
            debug!("[{}] cache hit for {}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    /// Loads through the single-flight gate so concurrent misses for one key
    /// share a single peer fetch or loader call.
    async fn load(&self, key: &str) -> Result<Value> {
        self.stats.record_load();
        self.loader
            .work(key, || async {
                // A flight that just finished may already have filled the store.
                if let Some(value) = self.main_cache.get(key) {
                    self.stats.record_cache_hit();
                    return Ok(value);
                }
                self.stats.record_load_deduped();

                match self.load_timeout {
                    Some(limit) => tokio::time::timeout(limit, self.fetch(key))
                        .await
                        .unwrap_or_else(|_| {
                            Err(CacheError::Timeout(format!(
                                "loading {} exceeded {:?}",
                                key, limit
                            )))
                        }),
                    None => self.fetch(key).await,
                }
            })
            .await
    }

    async fn fetch(&self, key: &str) -> Result<Value> {
        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_recoverable() => return Err(err),
                Err(err) => {
                    self.stats.record_peer_error();
                    warn!(
                        "[{}] failed to get {} from peer, loading locally: {}",
                        self.name, key, err
                    );
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<Value> {
        let bytes = peer.get(&self.name, key).await?;
        self.stats.record_peer_load();

        // Kept locally as well, to spare the next round-trip.
        let value = Value::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    async fn get_locally(&self, key: &str) -> Result<Value> {
        info!("[{}] loading {} from source", self.name, key);
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_local_load_err();
                return Err(err);
            }
        };
        self.stats.record_local_load();

        let value = Value::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: Value) {
        self.main_cache.add(key, value);
    }

    // == Stats ==
    /// Returns the group's lookup counters.
    pub fn stats(&self) -> GroupStatsSnapshot {
        self.stats.snapshot()
    }

    /// Counts one request served on behalf of a peer.
    pub fn record_server_request(&self) {
        self.stats.record_server_request();
    }

    /// Returns the local store's statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.main_cache.stats()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .field("load_timeout", &self.load_timeout)
            .finish()
    }
}
