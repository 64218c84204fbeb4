//! Error types for the peer cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the peer cache.
///
/// Cloneable so one coalesced load can hand the same outcome to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Lookup key failed validation (empty key)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The backing source has no value for the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The backing-store loader failed
    #[error("Loader error: {0}")]
    Loader(String),

    /// Talking to a peer failed (network, status or envelope decoding)
    #[error("Peer error: {0}")]
    Peer(String),

    /// Malformed peer request or undecodable payload
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid wiring of groups or peers
    #[error("Configuration error: {0}")]
    Config(String),

    /// A load did not finish before its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Peer failures are absorbed by the group and answered by the local loader.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CacheError::Peer(_))
    }

    fn status(&self) -> StatusCode {
        match self {
            CacheError::InvalidKey(_) | CacheError::Protocol(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::Loader(_) | CacheError::Config(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the peer cache.
pub type Result<T> = std::result::Result<T, CacheError>;
