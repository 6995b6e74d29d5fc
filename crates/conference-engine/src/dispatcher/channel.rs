use tracing::{debug, info};

use rvoip_ari_core::event::types::{
    ChannelCreated, ChannelDestroyed, ChannelStateChange, ChannelVarset, StasisStart,
};
use rvoip_ari_core::Channel;

use crate::error::{ConferenceError, DatabaseError, Result};

use super::EventDispatcher;

impl EventDispatcher {
    pub(super) async fn channel_created(&self, event: ChannelCreated) -> Result<()> {
        let channel = Channel::from_ari(&event.header.asterisk_id, &event.channel, &event.header.timestamp);
        self.db.channel_create(&channel).await?;
        debug!("Channel {} ({}) created", channel.id, channel.name);
        Ok(())
    }

    /// Missing channels are not hung up here; the channel is already gone.
    pub(super) async fn channel_destroyed(&self, event: ChannelDestroyed) -> Result<()> {
        let id = &event.channel.id;
        if !self.db.channel_is_exist(id, self.existence_timeout).await {
            return Err(ConferenceError::not_found(format!("channel {}", id)));
        }
        self.db
            .channel_end(id, &event.header.timestamp, event.cause)
            .await?;
        info!("📴 Channel {} destroyed ({} {})", id, event.cause, event.cause_txt);
        Ok(())
    }

    pub(super) async fn channel_state_change(&self, event: ChannelStateChange) -> Result<()> {
        let id = &event.channel.id;
        self.require_channel(&event.header.asterisk_id, id).await?;
        self.db
            .channel_set_state(id, &event.header.timestamp, event.channel.state)
            .await?;
        Ok(())
    }

    pub(super) async fn channel_varset(&self, event: ChannelVarset) -> Result<()> {
        let Some(channel) = event.channel.as_ref() else {
            debug!("Global variable {} set, ignoring", event.variable);
            return Ok(());
        };
        self.require_channel(&event.header.asterisk_id, &channel.id).await?;
        self.db
            .channel_set_variable(&channel.id, &event.variable, &event.value)
            .await?;
        Ok(())
    }

    /// Channel entered the stasis application; unknown channels are created from the
    /// event's snapshot
    pub(super) async fn stasis_start(&self, event: StasisStart) -> Result<()> {
        let id = &event.channel.id;
        match self.db.channel_get(id).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound(_)) => {
                let channel = Channel::from_ari(&event.header.asterisk_id, &event.channel, &event.header.timestamp);
                self.db.channel_create(&channel).await?;
            }
            Err(e) => return Err(e.into()),
        }

        self.db
            .channel_set_stasis(id, &event.header.application, &event.arg_pairs())
            .await?;
        debug!("Channel {} entered stasis {}", id, event.header.application);
        Ok(())
    }
}
