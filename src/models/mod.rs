//! Request and Response models for the front-end API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::LookupQuery;
pub use responses::{GroupStatsResponse, HealthResponse, StatsResponse};
