use std::borrow::Borrow;
use std::fmt::Display;
use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::{sleep, Instant};
use tracing::info;
use uuid::Uuid;

use rvoip_ari_core::{Bridge, Channel};

use crate::error::DatabaseError;
use crate::models::{Conference, Recording};

use super::DbResult;

const EXIST_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// In-memory repository on concurrent maps
///
/// Each field mutation happens under the map's per-entry lock, so two handlers writing
/// different fields of the same record never overwrite each other.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    pub(super) channels: DashMap<String, Channel>,
    pub(super) bridges: DashMap<String, Bridge>,
    pub(super) conferences: DashMap<Uuid, Conference>,
    pub(super) recordings: DashMap<Uuid, Recording>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        info!("🗄️ Creating in-memory conference database");
        Self::default()
    }

    /// Insert a record, failing if the key is taken
    pub(super) fn insert_new<K, V>(map: &DashMap<K, V>, key: K, value: V, what: &str) -> DbResult<()>
    where
        K: Hash + Eq + Display,
    {
        match map.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Err(DatabaseError::storage(format!(
                "{} {} already exists",
                what,
                entry.key()
            ))),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Apply `f` to a record in place
    pub(super) fn modify<K, Q, V, F>(map: &DashMap<K, V>, key: &Q, what: &str, f: F) -> DbResult<()>
    where
        K: Hash + Eq + Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
        F: FnOnce(&mut V),
    {
        match map.get_mut(key) {
            Some(mut entry) => {
                f(entry.value_mut());
                Ok(())
            }
            None => Err(DatabaseError::not_found(format!("{} {}", what, key))),
        }
    }

    pub(super) fn fetch<K, Q, V>(map: &DashMap<K, V>, key: &Q, what: &str) -> DbResult<V>
    where
        K: Hash + Eq + Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
        V: Clone,
    {
        map.get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DatabaseError::not_found(format!("{} {}", what, key)))
    }

    /// Poll until the key shows up or the timeout elapses
    pub(super) async fn wait_exist<K, Q, V>(map: &DashMap<K, V>, key: &Q, timeout: Duration) -> bool
    where
        K: Hash + Eq + Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if map.contains_key(key) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(EXIST_POLL_INTERVAL).await;
        }
    }
}
