//! Per-conference serialization
//!
//! Every read-modify-write on a conference (joined, leaved, terminate, update,
//! recording) runs while holding that conference's lock. Locks for different
//! conferences are independent, and an entry is dropped from the map as soon as
//! nobody holds or waits for it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ConferenceLocks {
    inner: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ConferenceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a conference
    pub async fn lock(&self, id: Uuid) -> ConferenceGuard {
        let lock = self
            .inner
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.clone().lock_owned().await;
        ConferenceGuard {
            id,
            guard: Some(guard),
            lock,
            map: self.inner.clone(),
        }
    }

    /// Number of conferences with a live lock entry
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one conference, released on drop
#[derive(Debug)]
pub struct ConferenceGuard {
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
    map: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ConferenceGuard {
    pub fn conference_id(&self) -> Uuid {
        self.id
    }
}

impl Drop for ConferenceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // the map and this guard hold the only references when nobody else is waiting
        self.map
            .remove_if(&self.id, |_, lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = ConferenceLocks::new();
        let id = Uuid::new_v4();
        {
            let guard = locks.lock(id).await;
            assert_eq!(guard.conference_id(), id);
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_same_conference_is_serialized() {
        let locks = ConferenceLocks::new();
        let id = Uuid::new_v4();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.lock(id).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_conferences_do_not_block() {
        let locks = ConferenceLocks::new();
        let _a = locks.lock(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }
}
