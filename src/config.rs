//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::peers::{PoolOptions, DEFAULT_BASE_PATH};
use crate::ring::DEFAULT_REPLICAS;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port of the peer protocol server
    pub port: u16,
    /// Base URL other peers use to reach this node
    pub self_addr: String,
    /// Base URLs of every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Byte budget of each group's local store
    pub cache_bytes: usize,
    /// Virtual replicas per peer on the hash ring
    pub replicas: usize,
    /// Path prefix of the peer protocol
    pub base_path: String,
    /// Deadline of one peer request in milliseconds
    pub peer_timeout_ms: u64,
    /// Deadline of one coalesced load in milliseconds (0 = none)
    pub load_timeout_ms: u64,
    /// Whether to start the front-end API server
    pub api_enabled: bool,
    /// Port of the front-end API server
    pub api_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - Peer server port (default: 8001)
    /// - `SELF_ADDR` - This node's base URL (default: http://localhost:{PORT})
    /// - `PEERS` - Comma-separated peer base URLs (default: this node only)
    /// - `CACHE_BYTES` - Per-group store budget in bytes (default: 2048)
    /// - `REPLICAS` - Virtual replicas per peer (default: 50)
    /// - `BASE_PATH` - Peer protocol prefix (default: /_cache_/)
    /// - `PEER_TIMEOUT_MS` - Peer request deadline (default: 5000)
    /// - `LOAD_TIMEOUT_MS` - Load deadline, 0 disables (default: 10000)
    /// - `API_ENABLED` - Start the front-end API (default: false)
    /// - `API_PORT` - Front-end API port (default: 9999)
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port: u16 = parse_or(var("PORT"), defaults.port);
        let self_addr = var("SELF_ADDR").unwrap_or_else(|| format!("http://localhost:{}", port));
        let peers = var("PEERS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|peer| !peer.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            port,
            self_addr,
            peers,
            cache_bytes: parse_or(var("CACHE_BYTES"), defaults.cache_bytes),
            replicas: parse_or(var("REPLICAS"), defaults.replicas),
            base_path: var("BASE_PATH").unwrap_or(defaults.base_path),
            peer_timeout_ms: parse_or(var("PEER_TIMEOUT_MS"), defaults.peer_timeout_ms),
            load_timeout_ms: parse_or(var("LOAD_TIMEOUT_MS"), defaults.load_timeout_ms),
            api_enabled: parse_or(var("API_ENABLED"), defaults.api_enabled),
            api_port: parse_or(var("API_PORT"), defaults.api_port),
        }
    }

    /// Options for this node's peer pool.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            hash: None,
            peer_timeout: Duration::from_millis(self.peer_timeout_ms),
        }
    }

    /// Load deadline for groups, `None` when disabled.
    pub fn load_timeout(&self) -> Option<Duration> {
        (self.load_timeout_ms > 0).then(|| Duration::from_millis(self.load_timeout_ms))
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            self_addr: "http://localhost:8001".to_string(),
            peers: vec!["http://localhost:8001".to_string()],
            cache_bytes: 2 << 10,
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            peer_timeout_ms: 5000,
            load_timeout_ms: 10_000,
            api_enabled: false,
            api_port: 9999,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.port, 8001);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.base_path, "/_cache_/");
        assert!(!config.api_enabled);
    }

    #[test]
    fn test_config_from_empty_env_matches_defaults() {
        let config = from_map(&[]);
        let defaults = Config::default();
        assert_eq!(config.port, defaults.port);
        assert_eq!(config.self_addr, defaults.self_addr);
        assert_eq!(config.peers, defaults.peers);
        assert_eq!(config.load_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_config_from_vars() {
        let config = from_map(&[
            ("PORT", "8002"),
            ("PEERS", "http://a:8001, http://b:8002,,"),
            ("CACHE_BYTES", "4096"),
            ("LOAD_TIMEOUT_MS", "0"),
            ("API_ENABLED", "true"),
        ]);

        assert_eq!(config.port, 8002);
        assert_eq!(config.self_addr, "http://localhost:8002");
        assert_eq!(config.peers, vec!["http://a:8001", "http://b:8002"]);
        assert_eq!(config.cache_bytes, 4096);
        assert_eq!(config.load_timeout(), None);
        assert!(config.api_enabled);
    }

    #[test]
    fn test_config_invalid_values_fall_back() {
        let config = from_map(&[("PORT", "not-a-port"), ("REPLICAS", "-3")]);
        assert_eq!(config.port, 8001);
        assert_eq!(config.replicas, 50);
    }

    #[test]
    fn test_pool_options() {
        let config = from_map(&[("PEER_TIMEOUT_MS", "250"), ("REPLICAS", "10")]);
        let options = config.pool_options();
        assert_eq!(options.peer_timeout, Duration::from_millis(250));
        assert_eq!(options.replicas, 10);
    }
}
