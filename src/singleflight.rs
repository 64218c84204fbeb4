//! Single-Flight Module
//!
//! Collapses concurrent work for the same key into one execution.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// An in-flight call: waiters subscribe to its outcome.
#[derive(Debug)]
struct Call<T> {
    id: u64,
    outcome: watch::Receiver<Option<T>>,
}

// == Flight Group ==
/// Deduplicates concurrent calls sharing a key.
///
/// The first caller for a key runs the work; callers arriving while it runs
/// wait and receive a clone of the same outcome. The record is dropped as
/// soon as the work finishes, so it never serves as a cache.
#[derive(Debug)]
pub struct FlightGroup<T> {
    calls: Mutex<HashMap<String, Call<T>>>,
    next_id: AtomicU64,
}

impl<T: Clone> FlightGroup<T> {
    // == Constructor ==
    /// Creates an empty flight group.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    // == Work ==
    /// Runs `work` unless a call for `key` is already in flight, in which case
    /// the in-flight outcome is awaited and returned.
    ///
    /// If the caller running the work is cancelled before finishing, its
    /// waiters start over and one of them runs the work instead.
    pub async fn work<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let joined = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(call) => Err(call.outcome.clone()),
                    None => {
                        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                        let (tx, rx) = watch::channel(None);
                        calls.insert(key.to_string(), Call { id, outcome: rx });
                        Ok((id, tx))
                    }
                }
            };

            match joined {
                Ok((id, tx)) => {
                    let guard = CallGuard {
                        calls: &self.calls,
                        key,
                        id,
                    };
                    let outcome = work().await;
                    tx.send_replace(Some(outcome.clone()));
                    drop(guard);
                    return outcome;
                }
                Err(mut outcome) => {
                    let shared = match outcome.wait_for(Option::is_some).await {
                        Ok(ready) => (*ready).clone(),
                        Err(_) => None,
                    };
                    match shared {
                        Some(value) => return value,
                        None => debug!("In-flight call for {} abandoned, retrying", key),
                    }
                }
            }
        }
    }

    /// Number of keys currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the call record when the leading caller finishes or is dropped.
struct CallGuard<'a, T> {
    calls: &'a Mutex<HashMap<String, Call<T>>>,
    key: &'a str,
    id: u64,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        let mut calls = self.calls.lock();
        if calls.get(self.key).is_some_and(|call| call.id == self.id) {
            calls.remove(self.key);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    #[tokio::test]
    async fn test_single_call() {
        let group = FlightGroup::new();
        let value = group.work("key", || async { "bar".to_string() }).await;
        assert_eq!(value, "bar");
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_error_is_returned_unchanged() {
        let group: FlightGroup<Result<String, String>> = FlightGroup::new();
        let value = group
            .work("key", || async { Err("boom".to_string()) })
            .await;
        assert_eq!(value, Err("boom".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_are_deduplicated() {
        const CALLERS: usize = 10;
        let group = Arc::new(FlightGroup::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let group = group.clone();
            let calls = calls.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                group
                    .work("key", || async {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        format!("result-{}", n)
                    })
                    .await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == "result-1"));
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_record_removed_after_completion() {
        let group = FlightGroup::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            group
                .work("key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let group = FlightGroup::new();
        let (a, b) = tokio::join!(
            group.work("a", || async { 1 }),
            group.work("b", || async { 2 }),
        );
        assert_eq!((a, b), (1, 2));
    }

    #[tokio::test]
    async fn test_abandoned_leader_hands_over_to_waiter() {
        let group = Arc::new(FlightGroup::new());

        let leader = {
            let group = group.clone();
            tokio::spawn(async move {
                group
                    .work("key", || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        "never"
                    })
                    .await
            })
        };
        while group.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        let waiter = {
            let group = group.clone();
            tokio::spawn(async move { group.work("key", || async { "takeover" }).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        leader.abort();

        let value = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, "takeover");
        assert_eq!(group.in_flight(), 0);
    }
}
