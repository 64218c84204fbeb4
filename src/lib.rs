//! Peer Cache - An embeddable, peer-aware read-through cache
//!
//! Serves lookups from a byte-bounded local LRU, coalesces concurrent misses,
//! asks the peer that owns a key (by consistent hashing) before falling back
//! to an application-supplied loader.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;
pub mod singleflight;

pub use api::AppState;
pub use cache::Value;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{getter_fn, Getter, Group, GroupRegistry};
pub use peers::{HttpPool, PeerGetter, PeerPicker};
