//! API Module
//!
//! HTTP handlers and routing for the front-end that exposes cached groups to
//! outside clients.
//!
//! # Endpoints
//! - `GET /api?group=<name>&key=<key>` - Look up a value (raw bytes)
//! - `GET /stats` - Per-group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
