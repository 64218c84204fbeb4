//! Peer wire protocol
//!
//! Request paths and the binary response envelope shared by the peer client
//! and server.

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Path prefix under which peers serve each other.
pub const DEFAULT_BASE_PATH: &str = "/_cache_/";

// == Response Envelope ==
/// Body of a successful peer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerResponse {
    /// Raw value bytes
    pub value: Vec<u8>,
}

impl PeerResponse {
    /// Serializes the envelope with bincode.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CacheError::Internal(format!("encoding peer response: {}", e)))
    }

    /// Deserializes an envelope produced by [`PeerResponse::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| CacheError::Protocol(format!("decoding peer response: {}", e)))
    }
}

// == Paths ==
/// Builds the request path for `group`/`key`, percent-encoding both segments.
pub fn peer_path(base_path: &str, group: &str, key: &str) -> String {
    format!(
        "{}{}/{}",
        base_path,
        urlencoding::encode(group),
        urlencoding::encode(key)
    )
}

/// Splits a raw request path into its decoded group and key.
///
/// The path must start with `base_path` and carry exactly a group segment
/// and a key segment after it.
pub fn parse_peer_path(base_path: &str, path: &str) -> Result<(String, String)> {
    let rest = path
        .strip_prefix(base_path)
        .ok_or_else(|| CacheError::Protocol(format!("unexpected path: {}", path)))?;

    let (group, key) = rest.split_once('/').ok_or_else(|| {
        CacheError::Protocol(format!("expected {}<group>/<key>: {}", base_path, path))
    })?;
    if group.is_empty() {
        return Err(CacheError::Protocol(format!("missing group name: {}", path)));
    }

    Ok((decode_segment(group)?, decode_segment(key)?))
}

fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|e| CacheError::Protocol(format!("bad path segment {}: {}", segment, e)))
}
