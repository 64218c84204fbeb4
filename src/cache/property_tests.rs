//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the byte budget and recency invariants of the LRU.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{CacheStore, LruCache, OnEvicted, Value};

// == Strategies ==
/// Generates short keys so sequences revisit the same keys often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e][0-9]{0,2}".prop_map(|s| s)
}

/// Generates values of varying size
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,40}".prop_map(|s| s)
}

/// A single operation against the LRU
#[derive(Debug, Clone)]
enum LruOp {
    Add { key: String, value: String },
    Get { key: String },
}

fn lru_op_strategy() -> impl Strategy<Value = LruOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| LruOp::Add { key, value }),
        1 => key_strategy().prop_map(|key| LruOp::Get { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // After every add, the bytes charged never exceed the budget and always
    // equal the sum of key and value sizes of the surviving entries.
    #[test]
    fn prop_byte_budget_and_exact_accounting(
        max_bytes in 0usize..200,
        ops in prop::collection::vec(lru_op_strategy(), 1..100)
    ) {
        let evicted = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = evicted.clone();
        let hook: OnEvicted = Box::new(move |key: &str, _: &Value| {
            sink.lock().unwrap().push(key.to_string())
        });
        let mut lru = LruCache::new(max_bytes, Some(hook));
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                LruOp::Add { key, value } => {
                    lru.add(key.clone(), Value::from(value.as_str()));
                    model.insert(key, value);
                    for gone in evicted.lock().unwrap().drain(..) {
                        model.remove(&gone);
                    }

                    prop_assert!(lru.used_bytes() <= max_bytes);
                    let expected: usize = model.iter().map(|(k, v)| k.len() + v.len()).sum();
                    prop_assert_eq!(lru.used_bytes(), expected);
                    prop_assert_eq!(lru.len(), model.len());
                }
                LruOp::Get { key } => {
                    let got = lru.get(&key).map(|v| v.to_string());
                    prop_assert_eq!(got, model.get(&key).cloned());
                }
            }
        }
    }

    // Filling the cache in order and then adding one more entry evicts the
    // first key inserted, unless it was read in between.
    #[test]
    fn prop_lru_eviction_order(
        keys in prop::collection::hash_set("[a-z]{4}", 3..10),
        touch_first in any::<bool>()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        // Every entry costs 4 + 4 bytes.
        let store = CacheStore::new(keys.len() * 8);

        for key in &keys {
            store.add(key, Value::from("vvvv"));
        }
        if touch_first {
            prop_assert!(store.get(&keys[0]).is_some());
        }
        store.add("zzzzz", Value::from("vvv"));

        let expected_gone = if touch_first { &keys[1] } else { &keys[0] };
        prop_assert!(store.get(expected_gone).is_none());
        prop_assert!(store.get("zzzzz").is_some());
        prop_assert_eq!(store.len(), keys.len());
        prop_assert_eq!(store.stats().evictions, 1);
    }
}
