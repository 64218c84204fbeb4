//! Consistent Hash Ring
//!
//! Maps keys onto a set of node names through virtual replicas, so the owner
//! of a key only changes for a small share of keys when nodes come and go.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Hash function used to place replicas and keys on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Default number of virtual replicas per node.
pub const DEFAULT_REPLICAS: usize = 50;

// == Hash Ring ==
/// Sorted ring of replica hashes, each pointing back at its node.
pub struct HashRing {
    replicas: usize,
    hash: HashFn,
    /// Replica hashes, kept sorted
    points: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring.
    ///
    /// # Arguments
    /// * `replicas` - Virtual points placed per node
    /// * `hash` - Hash override; CRC-32 (IEEE) when `None`
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        let hash = hash.unwrap_or_else(|| Arc::new(crc32fast::hash) as HashFn);
        Self {
            replicas,
            hash,
            points: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Places `replicas` points on the ring for every node.
    ///
    /// Point `i` of node `n` sits at `hash(format!("{i}{n}"))`. On a hash
    /// collision the node added last owns the point.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let point = (self.hash)(format!("{}{}", i, node).as_bytes());
                if self.owners.insert(point, node.to_string()).is_none() {
                    self.points.push(point);
                }
            }
        }
        self.points.sort_unstable();
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` on an empty ring.
    ///
    /// The owner is the first point clockwise from the key's hash, wrapping
    /// past the largest point back to the smallest.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.points.partition_point(|&point| point < hash) % self.points.len();
        self.owners.get(&self.points[idx]).map(String::as_str)
    }

    // == Introspection ==
    /// Returns true if no node has been added.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Distinct node names, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.owners.values().map(String::as_str).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("points", &self.points.len())
            .field("nodes", &self.nodes())
            .finish()
    }
}
