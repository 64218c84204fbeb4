//! Peer Cache - demo node
//!
//! Runs one cache node serving the `scores` group over the peer protocol,
//! and optionally the front-end API used by clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::api::{create_router, AppState};
use peercache::{getter_fn, CacheError, Config, Group, GroupRegistry, HttpPool};

/// Group served by the demo node.
const DEMO_GROUP: &str = "scores";

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the demo group backed by a slow in-memory database
/// 4. Build the peer pool and hand it to the group
/// 5. Start the front-end API server if enabled
/// 6. Serve the peer protocol until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, cache_bytes={}, port={}",
        config.self_addr, config.peers, config.cache_bytes, config.port
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.register(
        Group::new(DEMO_GROUP, config.cache_bytes, slow_db())
            .with_load_timeout(config.load_timeout()),
    )?;

    let pool = Arc::new(HttpPool::with_options(
        config.self_addr.clone(),
        config.pool_options(),
    )?);
    pool.set(config.peers.clone());
    group.register_peers(pool.clone())?;

    if config.api_enabled {
        let app = create_router(AppState::new(registry.clone(), DEMO_GROUP));
        let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind front-end API on {}", addr))?;
        info!("Front-end API listening on http://{}", addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
            {
                tracing::error!("Front-end API server failed: {}", e);
            }
        });
    }

    let app = pool.router(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind peer server on {}", addr))?;
    info!("Cache node running at {}", config.self_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Loader over a small in-memory score table, standing in for a slow database.
fn slow_db() -> impl peercache::Getter {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    getter_fn(move |key: &str| {
        info!("[SlowDB] search key {}", key);
        db.get(key)
            .map(|score| score.as_bytes().to_vec())
            .ok_or_else(|| CacheError::NotFound(format!("{} not exist", key)))
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
