//! Group Registry
//!
//! Name → group lookup, owned by the application and shared by reference
//! with whatever needs to find a group (the peer server, the front-end API).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::{Getter, Group};
use crate::error::{CacheError, Result};

// == Group Registry ==
/// Registry of groups keyed by name.
///
/// Lookups take a shared lock, registration an exclusive one. Groups are
/// never removed.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group with default options.
    pub fn new_group(
        &self,
        name: &str,
        cache_bytes: usize,
        getter: impl Getter + 'static,
    ) -> Result<Arc<Group>> {
        self.register(Group::new(name, cache_bytes, getter))
    }

    // == Register ==
    /// Registers a configured group. Names must be unique.
    pub fn register(&self, group: Group) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(group.name()) {
            return Err(CacheError::Config(format!(
                "duplicate group name: {}",
                group.name()
            )));
        }

        let group = Arc::new(group);
        groups.insert(group.name().to_string(), group.clone());
        info!("Registered cache group {}", group.name());
        Ok(group)
    }

    // == Get ==
    /// Looks up a group by name.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Registered group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }
}
