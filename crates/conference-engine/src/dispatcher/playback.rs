use tracing::debug;

use rvoip_ari_core::event::types::{AriPlayback, PlaybackFinished, PlaybackStarted};
use rvoip_ari_core::Channel;

use crate::error::{DatabaseError, Result};

use super::EventDispatcher;

impl EventDispatcher {
    /// Remember the playback on its target channel
    pub(super) async fn playback_started(&self, event: PlaybackStarted) -> Result<()> {
        let Some(channel) = self.playback_channel(&event.playback).await? else {
            return Ok(());
        };
        self.db.channel_set_playback_id(&channel.id, &event.playback.id).await?;
        Ok(())
    }

    pub(super) async fn playback_finished(&self, event: PlaybackFinished) -> Result<()> {
        let Some(channel) = self.playback_channel(&event.playback).await? else {
            return Ok(());
        };
        if channel.playback_id == event.playback.id {
            self.db.channel_set_playback_id(&channel.id, "").await?;
        }
        Ok(())
    }

    async fn playback_channel(&self, playback: &AriPlayback) -> Result<Option<Channel>> {
        let Some(channel_id) = playback.target_channel_id() else {
            debug!("Playback {} did not target a channel", playback.id);
            return Ok(None);
        };

        match self.db.channel_get(channel_id).await {
            Ok(channel) => Ok(Some(channel)),
            Err(DatabaseError::NotFound(_)) => {
                debug!("Playback {} on unknown channel {}", playback.id, channel_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
