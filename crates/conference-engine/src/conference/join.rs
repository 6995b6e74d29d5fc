use tracing::{debug, error, info, warn};
use uuid::Uuid;

use rvoip_ari_core::{Bridge, Channel, HangupReason};

use crate::error::{ConferenceError, Result};
use crate::models::{Conference, ConferenceStatus};
use crate::monitoring::{CONFERENCE_JOIN_TOTAL, CONFERENCE_LEAVE_TOTAL};

use super::classify::{classify, BridgeRole};
use super::engine::ConferenceEngine;

impl ConferenceEngine {
    /// Ask the call manager to move a call into the conference
    ///
    /// Membership is recorded later, when the call's channel actually enters the
    /// conference bridge.
    pub async fn join(&self, conference_id: Uuid, call_id: Uuid) -> Result<()> {
        let conference = self.db.conference_get(conference_id).await?;
        if conference.status != ConferenceStatus::Progressing {
            return Err(ConferenceError::invalid_state(format!(
                "conference {} is {}",
                conference_id,
                conference.status.as_str()
            )));
        }

        info!("📞 Adding call {} to conference {}", call_id, conference_id);
        self.call_manager
            .confbridge_call_add(conference.confbridge_id, call_id)
            .await?;
        Ok(())
    }

    /// Ask the call manager to remove a call from the conference
    pub async fn leave(&self, conference_id: Uuid, call_id: Uuid) -> Result<()> {
        let conference = self.db.conference_get(conference_id).await?;
        if !conference.call_ids.contains(&call_id) {
            return Err(ConferenceError::not_found(format!(
                "call {} is not in conference {}",
                call_id, conference_id
            )));
        }

        info!("👋 Kicking call {} from conference {}", call_id, conference_id);
        self.call_manager
            .confbridge_call_kick(conference.confbridge_id, call_id)
            .await?;
        Ok(())
    }

    /// A channel was added to a conference-managed bridge
    ///
    /// `channel` and `bridge` are the records as they are after the membership write.
    pub async fn on_channel_entered_bridge(&self, channel: &Channel, bridge: &Bridge) -> Result<()> {
        match self.classify_or_hangup(channel, bridge).await? {
            BridgeRole::Join => {
                debug!("Channel {} entered join bridge {}", channel.id, bridge.id);
                Ok(())
            }
            BridgeRole::Echo | BridgeRole::Mixing => {
                if !channel.is_call_leg() {
                    debug!("Channel {} is not a call leg, not counted", channel.id);
                    return Ok(());
                }
                let call = self.call_manager.call_get_by_channel_id(&channel.id).await?;
                self.joined(bridge.conference_id, call.id).await?;
                Ok(())
            }
        }
    }

    /// A channel was removed from a conference-managed bridge
    pub async fn on_channel_left_bridge(&self, channel: &Channel, bridge: &Bridge) -> Result<()> {
        match self.classify_or_hangup(channel, bridge).await? {
            BridgeRole::Join => {
                if bridge.channel_ids.is_empty() {
                    debug!("Join bridge {} is empty, deleting it", bridge.id);
                    if let Err(e) = self.ari.bridge_delete(&bridge.asterisk_id, &bridge.id).await {
                        warn!("⚠️ Could not delete join bridge {}: {}", bridge.id, e);
                    }
                }
                Ok(())
            }
            BridgeRole::Echo | BridgeRole::Mixing => {
                if !channel.is_call_leg() {
                    debug!("Channel {} is not a call leg, not counted", channel.id);
                    return Ok(());
                }
                let call = self.call_manager.call_get_by_channel_id(&channel.id).await?;
                self.leaved(bridge.conference_id, call.id).await?;
                Ok(())
            }
        }
    }

    /// Record that a call is now in the conference
    pub async fn joined(&self, conference_id: Uuid, call_id: Uuid) -> Result<Conference> {
        let _guard = self.locks.lock(conference_id).await;
        let conference = self.db.conference_get(conference_id).await?;

        self.call_manager
            .call_update_conference_id(call_id, conference_id)
            .await?;
        if let Err(e) = self.db.conference_add_call_id(conference_id, call_id).await {
            error!("❌ Could not add call {} to conference {}: {}", call_id, conference_id, e);
        }
        self.metrics
            .increment(CONFERENCE_JOIN_TOTAL, conference.conference_type.as_str());
        info!("➕ Call {} joined conference {}", call_id, conference_id);

        Ok(self.db.conference_get(conference_id).await?)
    }

    /// Record that a call left the conference
    ///
    /// An echo conference ends with its last participant.
    pub async fn leaved(&self, conference_id: Uuid, call_id: Uuid) -> Result<Conference> {
        let guard = self.locks.lock(conference_id).await;
        self.db.conference_get(conference_id).await?;

        if let Err(e) = self
            .call_manager
            .call_update_conference_id(call_id, Uuid::nil())
            .await
        {
            warn!("⚠️ Could not clear conference of call {}: {}", call_id, e);
        }
        self.db.conference_remove_call_id(conference_id, call_id).await?;
        let conference = self.db.conference_get(conference_id).await?;
        self.metrics
            .increment(CONFERENCE_LEAVE_TOTAL, conference.conference_type.as_str());
        info!("➖ Call {} left conference {}", call_id, conference_id);

        if conference.conference_type == rvoip_ari_core::ConferenceType::Echo
            && conference.call_ids.is_empty()
        {
            return self.terminate_locked(&guard, "echo finished").await;
        }
        Ok(conference)
    }

    async fn classify_or_hangup(&self, channel: &Channel, bridge: &Bridge) -> Result<BridgeRole> {
        match classify(bridge) {
            Ok(role) => Ok(role),
            Err(e) => {
                warn!("⚠️ {}; hanging up channel {}", e, channel.id);
                if let Err(hangup) = self
                    .ari
                    .channel_hangup(&channel.asterisk_id, &channel.id, HangupReason::Interworking)
                    .await
                {
                    warn!("⚠️ Could not hang up channel {}: {}", channel.id, hangup);
                }
                Err(e)
            }
        }
    }
}
