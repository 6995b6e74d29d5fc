//! # Repository
//!
//! The engine never caches channel, bridge or conference state across calls; every
//! handler reads the current record from the repository and writes back single fields.
//! The traits below are the boundary. [`MemoryDatabase`] implements all of them on
//! concurrent maps and is what the server runs with by default. Ended records stay
//! readable until a retention sweep ([`RetentionStore::purge_ended`]) drops them.

pub mod bridges;
pub mod channels;
pub mod conferences;
pub mod memory;
pub mod recordings;
pub mod retention;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use rvoip_ari_core::{Bridge, Channel, ChannelState};

use crate::error::DatabaseError;
use crate::models::{Conference, ConferenceStatus, Recording, RecordingStatus, UpdateConference};

pub use memory::MemoryDatabase;

/// Result type for repository operations
pub type DbResult<T> = std::result::Result<T, DatabaseError>;

#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn channel_create(&self, channel: &Channel) -> DbResult<()>;
    async fn channel_get(&self, id: &str) -> DbResult<Channel>;
    /// Wait up to `timeout` for the channel to appear
    async fn channel_is_exist(&self, id: &str, timeout: Duration) -> bool;
    async fn channel_end(&self, id: &str, timestamp: &str, hangup_cause: u16) -> DbResult<()>;
    /// Set the state; the first `Ringing`/`Up` also stamps `tm_ringing`/`tm_answer`
    async fn channel_set_state(&self, id: &str, timestamp: &str, state: ChannelState) -> DbResult<()>;
    async fn channel_set_variable(&self, id: &str, name: &str, value: &str) -> DbResult<()>;
    async fn channel_set_bridge_id(&self, id: &str, bridge_id: &str) -> DbResult<()>;
    async fn channel_set_stasis(&self, id: &str, stasis_name: &str, stasis_data: &HashMap<String, String>) -> DbResult<()>;
    async fn channel_set_playback_id(&self, id: &str, playback_id: &str) -> DbResult<()>;
}

#[async_trait]
pub trait BridgeStore: Send + Sync {
    async fn bridge_create(&self, bridge: &Bridge) -> DbResult<()>;
    async fn bridge_get(&self, id: &str) -> DbResult<Bridge>;
    /// Wait up to `timeout` for the bridge to appear
    async fn bridge_is_exist(&self, id: &str, timeout: Duration) -> bool;
    async fn bridge_end(&self, id: &str, timestamp: &str) -> DbResult<()>;
    async fn bridge_add_channel_id(&self, id: &str, channel_id: &str) -> DbResult<()>;
    async fn bridge_remove_channel_id(&self, id: &str, channel_id: &str) -> DbResult<()>;
}

#[async_trait]
pub trait ConferenceStore: Send + Sync {
    async fn conference_create(&self, conference: &Conference) -> DbResult<()>;
    async fn conference_get(&self, id: Uuid) -> DbResult<Conference>;
    /// Conferences of a customer created strictly before `token`, newest first
    async fn conference_list(&self, customer_id: Uuid, size: usize, token: &str) -> DbResult<Vec<Conference>>;
    async fn conference_set_status(&self, id: Uuid, status: ConferenceStatus) -> DbResult<()>;
    async fn conference_set(&self, id: Uuid, update: &UpdateConference) -> DbResult<()>;
    /// Append a call id; appending an id already present is a no-op
    async fn conference_add_call_id(&self, id: Uuid, call_id: Uuid) -> DbResult<()>;
    /// Remove a call id; removing an absent id is a no-op
    async fn conference_remove_call_id(&self, id: Uuid, call_id: Uuid) -> DbResult<()>;
    async fn conference_set_recording_id(&self, id: Uuid, recording_id: Uuid) -> DbResult<()>;
    async fn conference_add_recording_id(&self, id: Uuid, recording_id: Uuid) -> DbResult<()>;
    /// Mark terminated and stamp the delete time
    async fn conference_end(&self, id: Uuid, timestamp: &str) -> DbResult<()>;
}

#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn recording_create(&self, recording: &Recording) -> DbResult<()>;
    async fn recording_get(&self, id: Uuid) -> DbResult<Recording>;
    async fn recording_get_by_name(&self, recording_name: &str) -> DbResult<Recording>;
    async fn recording_set_status(&self, id: Uuid, status: RecordingStatus, timestamp: &str) -> DbResult<()>;
}

/// Records removed by a retention sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    pub channels: usize,
    pub bridges: usize,
    pub conferences: usize,
    pub recordings: usize,
}

impl PurgeStats {
    pub fn total(&self) -> usize {
        self.channels + self.bridges + self.conferences + self.recordings
    }
}

#[async_trait]
pub trait RetentionStore: Send + Sync {
    /// Drop channels, bridges, conferences and recordings that ended before `cutoff`
    async fn purge_ended(&self, cutoff: &str) -> DbResult<PurgeStats>;
}

/// Everything the engine needs from persistence
pub trait Repository: ChannelStore + BridgeStore + ConferenceStore + RecordingStore + RetentionStore {}

impl<T> Repository for T where T: ChannelStore + BridgeStore + ConferenceStore + RecordingStore + RetentionStore {}
