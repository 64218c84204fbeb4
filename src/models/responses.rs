//! Response DTOs for the front-end API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::group::{Group, GroupStatsSnapshot};

/// Statistics of one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsResponse {
    /// Group name
    pub name: String,
    /// Lookup counters of the group
    pub group: GroupStatsSnapshot,
    /// Local store statistics
    pub cache: CacheStats,
    /// Share of lookups answered from the local store
    pub hit_rate: f64,
}

impl GroupStatsResponse {
    /// Captures the current statistics of `group`
    pub fn from_group(group: &Group) -> Self {
        let stats = group.stats();
        let hit_rate = if stats.gets > 0 {
            stats.cache_hits as f64 / stats.gets as f64
        } else {
            0.0
        };
        Self {
            name: group.name().to_string(),
            group: stats,
            cache: group.cache_stats(),
            hit_rate,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// One entry per registered group, sorted by name
    pub groups: Vec<GroupStatsResponse>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
