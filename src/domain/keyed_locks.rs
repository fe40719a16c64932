//! Per-key async mutexes.
//!
//! [`KeyedLocks`] hands out one [`tokio::sync::Mutex`] per key so that
//! read-then-write sequences on the same key run one at a time while
//! different keys proceed concurrently. Entries nobody holds or waits on
//! are pruned on the next acquisition.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created lock per key.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for exclusive access to `key`. Access ends when the guard is
    /// dropped.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().await;
            // A strong count of 1 means only the table still refers to it.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    /// Returns the number of keys currently held or awaited.
    pub async fn len(&self) -> usize {
        let map = self.locks.lock().await;
        map.values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }

    /// Returns `true` if no key is held or awaited.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}
