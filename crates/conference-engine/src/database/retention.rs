use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use rvoip_ari_core::timestamp;

use super::memory::MemoryDatabase;
use super::{DbResult, PurgeStats, RetentionStore};

fn ended_before(ts: &str, cutoff: &str) -> bool {
    !timestamp::is_unset(ts) && ts < cutoff
}

fn purge<K, V, F>(map: &DashMap<K, V>, ended_at: F, cutoff: &str) -> usize
where
    K: std::hash::Hash + Eq,
    F: Fn(&V) -> &str,
{
    let before = map.len();
    map.retain(|_, record| !ended_before(ended_at(record), cutoff));
    before.saturating_sub(map.len())
}

#[async_trait]
impl RetentionStore for MemoryDatabase {
    async fn purge_ended(&self, cutoff: &str) -> DbResult<PurgeStats> {
        let stats = PurgeStats {
            channels: purge(&self.channels, |c| c.tm_end.as_str(), cutoff),
            bridges: purge(&self.bridges, |b| b.tm_delete.as_str(), cutoff),
            conferences: purge(&self.conferences, |c| c.tm_delete.as_str(), cutoff),
            recordings: purge(&self.recordings, |r| r.tm_end.as_str(), cutoff),
        };
        if stats.total() > 0 {
            debug!("Purged records ended before {}: {:?}", cutoff, stats);
        }
        Ok(stats)
    }
}
