//! HTTP peer transport
//!
//! [`HttpPool`] picks peers off a consistent-hash ring and serves the peer
//! protocol; [`HttpGetter`] is the client side for one remote peer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use parking_lot::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::protocol::{parse_peer_path, peer_path, PeerResponse, DEFAULT_BASE_PATH};
use super::{PeerGetter, PeerPicker};
use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::ring::{HashFn, HashRing, DEFAULT_REPLICAS};

// == Pool Options ==
/// Tuning for an [`HttpPool`].
#[derive(Clone)]
pub struct PoolOptions {
    /// Path prefix of the peer protocol; must start and end with `/`
    pub base_path: String,
    /// Virtual replicas per peer on the ring
    pub replicas: usize,
    /// Ring hash override (CRC-32 when `None`)
    pub hash: Option<HashFn>,
    /// Deadline for one peer request
    pub peer_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            peer_timeout: Duration::from_secs(5),
        }
    }
}

impl std::fmt::Debug for PoolOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolOptions")
            .field("base_path", &self.base_path)
            .field("replicas", &self.replicas)
            .field("custom_hash", &self.hash.is_some())
            .field("peer_timeout", &self.peer_timeout)
            .finish()
    }
}

/// Ring and per-peer clients, always replaced together.
#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// The set of peers this node talks to, addressed by base URL
/// (e.g. `http://10.0.0.2:8001`).
#[derive(Debug)]
pub struct HttpPool {
    self_addr: String,
    options: PoolOptions,
    client: reqwest::Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_addr`, with default options.
    pub fn new(self_addr: impl Into<String>) -> Result<Self> {
        Self::with_options(self_addr, PoolOptions::default())
    }

    /// Creates a pool with explicit options.
    pub fn with_options(self_addr: impl Into<String>, options: PoolOptions) -> Result<Self> {
        if !options.base_path.starts_with('/') || !options.base_path.ends_with('/') {
            return Err(CacheError::Config(format!(
                "base path must start and end with '/': {}",
                options.base_path
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(options.peer_timeout)
            .build()
            .map_err(|e| CacheError::Config(format!("failed to create HTTP client: {}", e)))?;

        let ring = HashRing::new(options.replicas, options.hash.clone());
        Ok(Self {
            self_addr: normalize_addr(self_addr),
            options,
            client,
            state: RwLock::new(PoolState {
                ring,
                getters: HashMap::new(),
            }),
        })
    }

    // == Set Peers ==
    /// Replaces the peer list. The ring and the client table are rebuilt and
    /// swapped in under one write lock.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(normalize_addr).collect();

        let mut ring = HashRing::new(self.options.replicas, self.options.hash.clone());
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(peer, &self.options.base_path, self.client.clone());
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
        info!("[Server {}] peers set to {:?}", self.self_addr, peers);
    }

    /// This node's own address.
    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    /// Path prefix of the peer protocol.
    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    /// Currently configured peers, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.state.read().getters.keys().cloned().collect();
        peers.sort();
        peers
    }

    // == Router ==
    /// Builds the axum router serving the peer protocol for `registry`.
    pub fn router(&self, registry: Arc<GroupRegistry>) -> Router {
        let state = PeerServerState {
            registry,
            base_path: Arc::from(self.options.base_path.as_str()),
        };

        Router::new()
            .route(&format!("{}*path", self.options.base_path), get(serve_peer))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }
        debug!("[Server {}] pick peer {}", self.self_addr, peer);
        state
            .getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}

/// Peer addresses compare equal with or without a trailing `/`.
fn normalize_addr(addr: impl Into<String>) -> String {
    let mut addr = addr.into();
    while addr.ends_with('/') {
        addr.pop();
    }
    addr
}

// == HTTP Getter ==
/// Client for one remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    base_path: String,
    client: reqwest::Client,
}

impl HttpGetter {
    /// Creates a client for the peer at `peer_addr`.
    pub fn new(peer_addr: &str, base_path: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: peer_addr.trim_end_matches('/').to_string(),
            base_path: base_path.to_string(),
            client,
        }
    }

    fn url(&self, group: &str, key: &str) -> String {
        format!("{}{}", self.base_url, peer_path(&self.base_path, group, key))
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url(group, key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::Peer(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(CacheError::Peer(format!(
                "{} returned: {}",
                self.base_url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))?;
        let envelope =
            PeerResponse::decode(&body).map_err(|e| CacheError::Peer(e.to_string()))?;
        Ok(envelope.value)
    }
}

// == Peer Server ==
#[derive(Clone)]
struct PeerServerState {
    registry: Arc<GroupRegistry>,
    base_path: Arc<str>,
}

/// Handler for GET {base_path}{group}/{key}
async fn serve_peer(State(state): State<PeerServerState>, uri: Uri) -> Response {
    let (group_name, key) = match parse_peer_path(&state.base_path, uri.path()) {
        Ok(parts) => parts,
        Err(err) => {
            warn!("Rejected peer request {}: {}", uri.path(), err);
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let Some(group) = state.registry.get(&group_name) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such group: {}", group_name),
        )
            .into_response();
    };
    group.record_server_request();

    let body = group.get(&key).await.and_then(|value| {
        PeerResponse {
            value: value.to_vec(),
        }
        .encode()
    });

    match body {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
