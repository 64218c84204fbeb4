//! Peers Module
//!
//! Capabilities a group uses to reach the rest of the cluster, and the
//! HTTP transport implementing them.
//!
//! # Protocol
//! - `GET {base_path}{group}/{key}` - Fetch a value from the owning node

mod http;
mod protocol;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use http::{HttpGetter, HttpPool, PoolOptions};
pub use protocol::{parse_peer_path, peer_path, PeerResponse, DEFAULT_BASE_PATH};

// == Peer Picker ==
/// Chooses the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when this node owns `key` (or no
    /// peers are known).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches values from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetches `key` of `group` from the peer.
    ///
    /// Any failure is reported as [`CacheError::Peer`](crate::error::CacheError::Peer).
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}
