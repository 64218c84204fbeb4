//! LRU Cache Module
//!
//! Implements a byte-budgeted Least Recently Used store.

use std::collections::HashMap;
use std::fmt;

use crate::cache::Value;

/// Sentinel index for "no node".
const NIL: usize = usize::MAX;

/// Callback invoked once for every evicted entry.
pub type OnEvicted = Box<dyn FnMut(&str, &Value) + Send>;

#[derive(Debug, Default)]
struct Node {
    key: String,
    value: Value,
    prev: usize,
    next: usize,
}

impl Node {
    fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

// == LRU Cache ==
/// Recency-ordered key/value store bounded by a byte budget.
///
/// Entries live in a slot vector linked into a doubly-linked list:
/// - `head` = Most recently used
/// - `tail` = Least recently used
///
/// An entry costs `key.len() + value.len()` bytes. After every insertion the
/// least recently used entries are dropped until `used_bytes <= max_bytes`.
/// A `max_bytes` of zero disables retention: every insertion is evicted
/// straight away.
pub struct LruCache {
    max_bytes: usize,
    used_bytes: usize,
    slots: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
    on_evicted: Option<OnEvicted>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_bytes` of keys and values.
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted>) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(self.slots[idx].value.clone())
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts down to the byte budget.
    ///
    /// The eviction callback, if any, runs once per evicted entry.
    pub fn add(&mut self, key: impl Into<String>, value: Value) {
        let evicted = self.add_collect(key, value);
        if let Some(on_evicted) = self.on_evicted.as_mut() {
            for (key, value) in &evicted {
                on_evicted(key, value);
            }
        }
    }

    /// Like [`LruCache::add`], but hands the evicted entries back instead of
    /// running the callback, so a caller holding a lock can notify after
    /// releasing it.
    pub fn add_collect(&mut self, key: impl Into<String>, value: Value) -> Vec<(String, Value)> {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            let node = &mut self.slots[idx];
            self.used_bytes = self.used_bytes + value.len() - node.value.len();
            node.value = value;
            self.move_to_front(idx);
        } else {
            self.used_bytes += key.len() + value.len();
            let idx = self.alloc(Node {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.index.insert(key, idx);
            self.push_front(idx);
        }

        let mut evicted = Vec::new();
        while self.used_bytes > self.max_bytes {
            match self.pop_oldest() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// The byte budget.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Returns the least recently used key without touching it.
    pub fn peek_oldest(&self) -> Option<&str> {
        (self.tail != NIL).then(|| self.slots[self.tail].key.as_str())
    }

    // == List Plumbing ==
    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        self.slots[idx].prev = NIL;
        self.slots[idx].next = old_head;
        if old_head != NIL {
            self.slots[old_head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head != idx {
            self.unlink(idx);
            self.push_front(idx);
        }
    }

    fn pop_oldest(&mut self) -> Option<(String, Value)> {
        let idx = self.tail;
        if idx == NIL {
            return None;
        }
        self.unlink(idx);
        self.free.push(idx);

        let node = std::mem::take(&mut self.slots[idx]);
        self.used_bytes -= node.size();
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_hook() -> (OnEvicted, Arc<Mutex<Vec<(String, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let hook: OnEvicted = Box::new(move |key: &str, value: &Value| {
            sink.lock().unwrap().push((key.to_string(), value.to_string()));
        });
        (hook, seen)
    }

    #[test]
    fn test_lru_new() {
        let lru = LruCache::new(100, None);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_get_hit_and_miss() {
        let mut lru = LruCache::new(100, None);
        lru.add("key1", Value::from("1234"));

        assert_eq!(lru.get("key1"), Some(Value::from("1234")));
        assert_eq!(lru.get("key2"), None);
    }

    #[test]
    fn test_lru_accounts_key_and_value_bytes() {
        let mut lru = LruCache::new(100, None);
        lru.add("ab", Value::from("xyz"));
        lru.add("c", Value::from("12345"));

        assert_eq!(lru.used_bytes(), 2 + 3 + 1 + 5);
    }

    #[test]
    fn test_lru_overwrite_adjusts_size() {
        let mut lru = LruCache::new(100, None);
        lru.add("key", Value::from("short"));
        lru.add("key", Value::from("much longer value"));

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.used_bytes(), 3 + 17);

        lru.add("key", Value::from("v"));
        assert_eq!(lru.used_bytes(), 3 + 1);
        assert_eq!(lru.get("key"), Some(Value::from("v")));
    }

    #[test]
    fn test_lru_evicts_oldest_when_over_budget() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let cap = k1.len() + k2.len() + v1.len() + v2.len();
        let mut lru = LruCache::new(cap, None);

        lru.add(k1, Value::from(v1));
        lru.add(k2, Value::from(v2));
        lru.add(k3, Value::from(v3));

        assert_eq!(lru.get("key1"), None);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_read_refreshes_recency() {
        let (hook, seen) = recording_hook();
        // Room for exactly three 2-byte entries.
        let mut lru = LruCache::new(6, Some(hook));

        lru.add("a", Value::from("1"));
        lru.add("b", Value::from("2"));
        lru.add("c", Value::from("3"));
        lru.get("a");
        lru.add("d", Value::from("4"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("b".to_string(), "2".to_string())]
        );
        assert!(lru.get("a").is_some());
        assert!(lru.get("c").is_some());
        assert!(lru.get("d").is_some());
    }

    #[test]
    fn test_lru_overwrite_refreshes_recency() {
        let mut lru = LruCache::new(6, None);

        lru.add("a", Value::from("1"));
        lru.add("b", Value::from("2"));
        lru.add("c", Value::from("3"));
        lru.add("a", Value::from("9"));

        assert_eq!(lru.peek_oldest(), Some("b"));
    }

    #[test]
    fn test_lru_eviction_callback_fires_once_per_entry() {
        let (hook, seen) = recording_hook();
        let mut lru = LruCache::new(10, Some(hook));

        lru.add("key1", Value::from("123456"));
        lru.add("k2", Value::from("k2"));
        lru.add("k3", Value::from("k3"));
        lru.add("k4", Value::from("k4"));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("key1".to_string(), "123456".to_string()),
                ("k2".to_string(), "k2".to_string()),
            ]
        );
    }

    #[test]
    fn test_lru_large_insert_evicts_many() {
        let mut lru = LruCache::new(10, None);
        lru.add("a", Value::from("1"));
        lru.add("b", Value::from("2"));
        lru.add("c", Value::from("3"));

        let evicted = lru.add_collect("big", Value::from("12345"));

        assert_eq!(evicted.len(), 2);
        assert_eq!(evicted[0].0, "a");
        assert_eq!(evicted[1].0, "b");
        assert!(lru.used_bytes() <= lru.max_bytes());
    }

    #[test]
    fn test_lru_entry_larger_than_budget_is_dropped() {
        let mut lru = LruCache::new(4, None);
        let evicted = lru.add_collect("key", Value::from("too large"));

        assert_eq!(evicted.len(), 1);
        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_zero_capacity_retains_nothing() {
        let (hook, seen) = recording_hook();
        let mut lru = LruCache::new(0, Some(hook));

        lru.add("k", Value::from("v"));

        assert!(lru.is_empty());
        assert_eq!(lru.get("k"), None);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_lru_slots_are_reused() {
        let mut lru = LruCache::new(4, None);
        for i in 0..100 {
            lru.add(format!("k{}", i % 10), Value::from("v"));
        }
        assert!(lru.slots.len() <= 3);
        assert_eq!(lru.len(), 1);
    }
}
