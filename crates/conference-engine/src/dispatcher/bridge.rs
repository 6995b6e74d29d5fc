use tracing::{debug, info};

use rvoip_ari_core::event::types::{
    BridgeCreated, BridgeDestroyed, ChannelEnteredBridge, ChannelLeftBridge,
};
use rvoip_ari_core::Bridge;

use crate::error::{ConferenceError, Result};

use super::EventDispatcher;

impl EventDispatcher {
    pub(super) async fn bridge_created(&self, event: BridgeCreated) -> Result<()> {
        let bridge = Bridge::from_ari(&event.header.asterisk_id, &event.bridge, &event.header.timestamp);
        self.db.bridge_create(&bridge).await?;
        debug!(
            "Bridge {} created ({} conference {})",
            bridge.id, bridge.conference_type, bridge.conference_id
        );
        Ok(())
    }

    pub(super) async fn bridge_destroyed(&self, event: BridgeDestroyed) -> Result<()> {
        let id = &event.bridge.id;
        if !self.db.bridge_is_exist(id, self.existence_timeout).await {
            return Err(ConferenceError::not_found(format!("bridge {}", id)));
        }
        self.db.bridge_end(id, &event.header.timestamp).await?;
        debug!("Bridge {} destroyed", id);
        Ok(())
    }

    pub(super) async fn channel_entered_bridge(&self, event: ChannelEnteredBridge) -> Result<()> {
        let asterisk_id = &event.header.asterisk_id;
        let channel_id = &event.channel.id;
        let bridge_id = &event.bridge.id;
        self.require_channel(asterisk_id, channel_id).await?;
        self.require_bridge(asterisk_id, bridge_id, Some(channel_id)).await?;

        self.db.channel_set_bridge_id(channel_id, bridge_id).await?;
        self.db.bridge_add_channel_id(bridge_id, channel_id).await?;

        let channel = self.db.channel_get(channel_id).await?;
        let bridge = self.db.bridge_get(bridge_id).await?;
        info!("🔗 Channel {} entered bridge {}", channel_id, bridge_id);
        self.engine.on_channel_entered_bridge(&channel, &bridge).await
    }

    pub(super) async fn channel_left_bridge(&self, event: ChannelLeftBridge) -> Result<()> {
        let asterisk_id = &event.header.asterisk_id;
        let channel_id = &event.channel.id;
        let bridge_id = &event.bridge.id;
        self.require_channel(asterisk_id, channel_id).await?;
        self.require_bridge(asterisk_id, bridge_id, Some(channel_id)).await?;

        self.db.channel_set_bridge_id(channel_id, "").await?;
        self.db.bridge_remove_channel_id(bridge_id, channel_id).await?;

        let channel = self.db.channel_get(channel_id).await?;
        let bridge = self.db.bridge_get(bridge_id).await?;
        info!("🔓 Channel {} left bridge {}", channel_id, bridge_id);
        self.engine.on_channel_left_bridge(&channel, &bridge).await
    }
}
