use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use rvoip_ari_core::timestamp;
use rvoip_ari_core::{Channel, ChannelState};

use super::memory::MemoryDatabase;
use super::{ChannelStore, DbResult};

const WHAT: &str = "channel";

#[async_trait]
impl ChannelStore for MemoryDatabase {
    async fn channel_create(&self, channel: &Channel) -> DbResult<()> {
        debug!("Creating channel {} ({})", channel.id, channel.name);
        Self::insert_new(&self.channels, channel.id.clone(), channel.clone(), WHAT)
    }

    async fn channel_get(&self, id: &str) -> DbResult<Channel> {
        Self::fetch(&self.channels, id, WHAT)
    }

    async fn channel_is_exist(&self, id: &str, timeout: Duration) -> bool {
        Self::wait_exist(&self.channels, id, timeout).await
    }

    async fn channel_end(&self, id: &str, timestamp: &str, hangup_cause: u16) -> DbResult<()> {
        Self::modify(&self.channels, id, WHAT, |channel| {
            channel.hangup_cause = hangup_cause;
            channel.state = ChannelState::Down;
            channel.tm_end = timestamp.to_string();
            channel.tm_update = timestamp.to_string();
        })
    }

    async fn channel_set_state(&self, id: &str, timestamp: &str, state: ChannelState) -> DbResult<()> {
        Self::modify(&self.channels, id, WHAT, |channel| {
            channel.state = state;
            match state {
                ChannelState::Ringing if timestamp::is_unset(&channel.tm_ringing) => {
                    channel.tm_ringing = timestamp.to_string();
                }
                ChannelState::Up if timestamp::is_unset(&channel.tm_answer) => {
                    channel.tm_answer = timestamp.to_string();
                }
                _ => {}
            }
            channel.tm_update = timestamp.to_string();
        })
    }

    async fn channel_set_variable(&self, id: &str, name: &str, value: &str) -> DbResult<()> {
        Self::modify(&self.channels, id, WHAT, |channel| {
            channel.apply_variable(name, value);
            channel.tm_update = timestamp::now();
        })
    }

    async fn channel_set_bridge_id(&self, id: &str, bridge_id: &str) -> DbResult<()> {
        Self::modify(&self.channels, id, WHAT, |channel| {
            channel.bridge_id = bridge_id.to_string();
            channel.tm_update = timestamp::now();
        })
    }

    async fn channel_set_stasis(
        &self,
        id: &str,
        stasis_name: &str,
        stasis_data: &HashMap<String, String>,
    ) -> DbResult<()> {
        Self::modify(&self.channels, id, WHAT, |channel| {
            channel.stasis_name = stasis_name.to_string();
            for (key, value) in stasis_data {
                channel.apply_variable(key, value);
                channel.stasis_data.insert(key.clone(), value.clone());
            }
            channel.tm_update = timestamp::now();
        })
    }

    async fn channel_set_playback_id(&self, id: &str, playback_id: &str) -> DbResult<()> {
        Self::modify(&self.channels, id, WHAT, |channel| {
            channel.playback_id = playback_id.to_string();
            channel.tm_update = timestamp::now();
        })
    }
}
