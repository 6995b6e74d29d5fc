//! # ARI event dispatcher
//!
//! Routes each decoded [`Event`] to its handler. Every handler follows the same
//! steps: make sure the channel/bridge the event names is known (waiting up to the
//! configured existence timeout), write the affected fields, and for bridge membership
//! changes re-read both records and hand them to the [`ConferenceEngine`].
//!
//! A channel event naming an unknown channel gets that channel hung up so the engine
//! does not keep resources nobody tracks.

mod bridge;
mod channel;
mod playback;
mod recording;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use rvoip_ari_core::{AriCommands, Event, EventHandler, HandlerError, HangupReason};

use crate::conference::ConferenceEngine;
use crate::database::Repository;
use crate::error::{ConferenceError, Result};
use crate::monitoring::{MetricsSink, ARI_EVENT_TOTAL};

pub struct EventDispatcher {
    db: Arc<dyn Repository>,
    engine: Arc<ConferenceEngine>,
    ari: Arc<dyn AriCommands>,
    metrics: Arc<dyn MetricsSink>,
    existence_timeout: Duration,
}

impl EventDispatcher {
    pub fn new(
        db: Arc<dyn Repository>,
        engine: Arc<ConferenceEngine>,
        ari: Arc<dyn AriCommands>,
        metrics: Arc<dyn MetricsSink>,
        existence_timeout: Duration,
    ) -> Self {
        Self {
            db,
            engine,
            ari,
            metrics,
            existence_timeout,
        }
    }

    pub async fn dispatch(&self, event: Event) -> Result<()> {
        self.metrics
            .increment(ARI_EVENT_TOTAL, event.event_type().as_str());

        match event {
            Event::ChannelCreated(e) => self.channel_created(e).await,
            Event::ChannelDestroyed(e) => self.channel_destroyed(e).await,
            Event::ChannelEnteredBridge(e) => self.channel_entered_bridge(e).await,
            Event::ChannelLeftBridge(e) => self.channel_left_bridge(e).await,
            Event::ChannelVarset(e) => self.channel_varset(e).await,
            Event::ChannelStateChange(e) => self.channel_state_change(e).await,
            Event::ChannelDtmfReceived(e) => {
                debug!("DTMF {} on channel {}", e.digit, e.channel.id);
                Ok(())
            }
            Event::BridgeCreated(e) => self.bridge_created(e).await,
            Event::BridgeDestroyed(e) => self.bridge_destroyed(e).await,
            Event::PlaybackStarted(e) => self.playback_started(e).await,
            Event::PlaybackFinished(e) => self.playback_finished(e).await,
            Event::RecordingStarted(e) => self.recording_started(e).await,
            Event::RecordingFinished(e) => self.recording_finished(e).await,
            Event::StasisStart(e) => self.stasis_start(e).await,
        }
    }

    /// Fail unless the channel is known; an unknown channel is hung up
    async fn require_channel(&self, asterisk_id: &str, channel_id: &str) -> Result<()> {
        if self.db.channel_is_exist(channel_id, self.existence_timeout).await {
            return Ok(());
        }
        self.hangup_unknown(asterisk_id, channel_id).await;
        Err(ConferenceError::not_found(format!("channel {}", channel_id)))
    }

    /// Fail unless the bridge is known; `channel_id`, when given, is hung up
    async fn require_bridge(&self, asterisk_id: &str, bridge_id: &str, channel_id: Option<&str>) -> Result<()> {
        if self.db.bridge_is_exist(bridge_id, self.existence_timeout).await {
            return Ok(());
        }
        if let Some(channel_id) = channel_id {
            self.hangup_unknown(asterisk_id, channel_id).await;
        }
        Err(ConferenceError::not_found(format!("bridge {}", bridge_id)))
    }

    async fn hangup_unknown(&self, asterisk_id: &str, channel_id: &str) {
        warn!("⚠️ Hanging up untracked channel {} on {}", channel_id, asterisk_id);
        if let Err(e) = self
            .ari
            .channel_hangup(asterisk_id, channel_id, HangupReason::Normal)
            .await
        {
            warn!("⚠️ Could not hang up channel {}: {}", channel_id, e);
        }
    }
}

#[async_trait]
impl EventHandler for EventDispatcher {
    async fn handle_event(&self, event: Event) -> std::result::Result<(), HandlerError> {
        self.dispatch(event).await.map_err(|e| Box::new(e) as HandlerError)
    }
}
