//! Per-key async locks.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of named async locks.
///
/// Holders of the same key serialize; different keys proceed in parallel.
/// Locks are created lazily on first use and kept for the life of the
/// process, matching the interaction table's never-delete key space.
#[derive(Clone, Default)]
pub struct KeyLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl KeyLocks {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting until it is free.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = KeyLocks::new();
        let guard = locks.acquire("like:u1:p1").await;

        let blocked = timeout(Duration::from_millis(50), locks.acquire("like:u1:p1")).await;
        assert!(blocked.is_err());

        drop(guard);
        let unblocked = timeout(Duration::from_millis(50), locks.acquire("like:u1:p1")).await;
        assert!(unblocked.is_ok());
    }

    #[tokio::test]
    async fn test_different_keys_proceed_in_parallel() {
        let locks = KeyLocks::new();
        let _guard = locks.acquire("like:u1:p1").await;

        let other = timeout(Duration::from_millis(50), locks.acquire("like:u2:p1")).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_guard_release_hands_off_in_order() {
        let locks = KeyLocks::new();
        let counter = Arc::new(std::sync::atomic::AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("follow:a:b").await;
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 8);
    }
}
