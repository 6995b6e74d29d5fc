use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use rvoip_ari_core::timestamp;
use rvoip_ari_core::Bridge;

use super::memory::MemoryDatabase;
use super::{BridgeStore, DbResult};

const WHAT: &str = "bridge";

#[async_trait]
impl BridgeStore for MemoryDatabase {
    async fn bridge_create(&self, bridge: &Bridge) -> DbResult<()> {
        debug!("Creating bridge {} ({})", bridge.id, bridge.name);
        Self::insert_new(&self.bridges, bridge.id.clone(), bridge.clone(), WHAT)
    }

    async fn bridge_get(&self, id: &str) -> DbResult<Bridge> {
        Self::fetch(&self.bridges, id, WHAT)
    }

    async fn bridge_is_exist(&self, id: &str, timeout: Duration) -> bool {
        Self::wait_exist(&self.bridges, id, timeout).await
    }

    async fn bridge_end(&self, id: &str, timestamp: &str) -> DbResult<()> {
        Self::modify(&self.bridges, id, WHAT, |bridge| {
            bridge.tm_delete = timestamp.to_string();
            bridge.tm_update = timestamp.to_string();
        })
    }

    async fn bridge_add_channel_id(&self, id: &str, channel_id: &str) -> DbResult<()> {
        Self::modify(&self.bridges, id, WHAT, |bridge| {
            if !bridge.channel_ids.iter().any(|c| c == channel_id) {
                bridge.channel_ids.push(channel_id.to_string());
            }
            bridge.tm_update = timestamp::now();
        })
    }

    async fn bridge_remove_channel_id(&self, id: &str, channel_id: &str) -> DbResult<()> {
        Self::modify(&self.bridges, id, WHAT, |bridge| {
            bridge.channel_ids.retain(|c| c != channel_id);
            bridge.tm_update = timestamp::now();
        })
    }
}
