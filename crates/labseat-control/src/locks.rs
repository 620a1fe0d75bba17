//! Per-seat mutual exclusion.
//!
//! Seat create and delete for the same server name must not interleave. Each
//! name gets its own async mutex; the entry is dropped from the table once no
//! task holds or waits on it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// A table of async locks keyed by server name.
#[derive(Debug, Default, Clone)]
pub struct SeatLocks {
    table: Arc<LockTable>,
}

impl SeatLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// The lock is held until the returned guard is dropped.
    pub async fn lock(&self, key: &str) -> SeatGuard {
        let mutex = {
            let mut table = self.table.lock();
            Arc::clone(table.entry(key.to_string()).or_default())
        };

        let guard = mutex.lock_owned().await;

        SeatGuard {
            key: key.to_string(),
            table: Arc::clone(&self.table),
            guard: Some(guard),
        }
    }

    /// Number of server names with a live lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Check whether no lock entry is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

/// Exclusive access to one seat.
#[derive(Debug)]
pub struct SeatGuard {
    key: String,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = self.table.lock();
        // Only the table itself still references the mutex: nobody is waiting.
        if table
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            table.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    async fn critical_section(
        locks: &SeatLocks,
        key: &str,
        inside: &AtomicBool,
        overlaps: &AtomicUsize,
    ) {
        let _guard = locks.lock(key).await;
        if inside.swap(true, Ordering::SeqCst) {
            overlaps.fetch_add(1, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        inside.store(false, Ordering::SeqCst);
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_serializes() {
        let locks = SeatLocks::new();
        let inside = AtomicBool::new(false);
        let overlaps = AtomicUsize::new(0);

        tokio::join!(
            critical_section(&locks, "doe-sfb.lab.io", &inside, &overlaps),
            critical_section(&locks, "doe-sfb.lab.io", &inside, &overlaps),
            critical_section(&locks, "doe-sfb.lab.io", &inside, &overlaps),
        );

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert!(locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn different_keys_do_not_block() {
        let locks = SeatLocks::new();

        let first = locks.lock("a.lab.io").await;
        let second = tokio::time::timeout(Duration::from_secs(1), locks.lock("b.lab.io")).await;

        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
        drop(first);
        drop(second);
        assert!(locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn held_lock_blocks_same_key() {
        let locks = SeatLocks::new();

        let _held = locks.lock("a.lab.io").await;
        let waiting = tokio::time::timeout(Duration::from_secs(1), locks.lock("a.lab.io")).await;

        assert!(waiting.is_err());
    }

    #[tokio::test]
    async fn entry_survives_while_waiter_queued() {
        let locks = SeatLocks::new();
        let held = locks.lock("a.lab.io").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("a.lab.io").await;
            })
        };
        tokio::task::yield_now().await;

        drop(held);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
