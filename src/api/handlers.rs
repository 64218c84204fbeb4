//! API Handlers
//!
//! HTTP request handlers for each front-end endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{GroupStatsResponse, HealthResponse, LookupQuery, StatsResponse};

/// Application state shared across all handlers.
///
/// Holds the group registry and the group used when a request names none.
#[derive(Clone)]
pub struct AppState {
    /// Registry of every group served by this node
    pub registry: Arc<GroupRegistry>,
    /// Group looked up when the query has no `group`
    pub default_group: String,
}

impl AppState {
    /// Creates a new AppState over `registry`.
    pub fn new(registry: Arc<GroupRegistry>, default_group: impl Into<String>) -> Self {
        Self {
            registry,
            default_group: default_group.into(),
        }
    }
}

/// Handler for GET /api
///
/// Looks a key up through its group and returns the raw value bytes.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Response> {
    let name = query.group.unwrap_or_else(|| state.default_group.clone());
    let group = state
        .registry
        .get(&name)
        .ok_or_else(|| CacheError::NotFound(format!("no such group: {}", name)))?;

    let value = group.get(&query.key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value.to_vec(),
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns statistics for every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let groups = state
        .registry
        .names()
        .iter()
        .filter_map(|name| state.registry.get(name))
        .map(|group| GroupStatsResponse::from_group(&group))
        .collect();

    Json(StatsResponse { groups })
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
