use tracing::{debug, info, warn};
use uuid::Uuid;

use rvoip_ari_core::timestamp;

use crate::error::{ConferenceError, Result};
use crate::models::{Conference, ConferenceStatus};
use crate::monitoring::CONFERENCE_CLOSE_TOTAL;
use crate::notify::WebhookEventType;

use super::engine::ConferenceEngine;
use super::locks::ConferenceGuard;

impl ConferenceEngine {
    /// Terminate a conference
    ///
    /// A conference already terminating or terminated is returned unchanged.
    pub async fn terminate(&self, id: Uuid, reason: &str) -> Result<Conference> {
        let guard = self.locks.lock(id).await;
        self.terminate_locked(&guard, reason).await
    }

    pub(super) async fn terminate_locked(&self, guard: &ConferenceGuard, reason: &str) -> Result<Conference> {
        let id = guard.conference_id();
        let conference = self.db.conference_get(id).await?;
        if conference.status.is_terminating_or_terminated() {
            debug!("Conference {} is already {}, nothing to terminate", id, conference.status.as_str());
            return Ok(conference);
        }

        info!("🛑 Terminating conference {} ({})", id, reason);
        self.db
            .conference_set_status(id, ConferenceStatus::Terminating)
            .await
            .map_err(ConferenceError::Persistence)?;

        if !conference.flow_id.is_nil() {
            if let Err(e) = self.flow_manager.flow_delete(conference.flow_id).await {
                warn!("⚠️ Could not delete flow {} of conference {}: {}", conference.flow_id, id, e);
            }
        }

        self.destroy(guard, &conference).await
    }

    /// Release the conference's resources and mark it terminated
    ///
    /// Only the terminal status write can fail this step.
    async fn destroy(&self, guard: &ConferenceGuard, conference: &Conference) -> Result<Conference> {
        let id = guard.conference_id();

        if !conference.confbridge_id.is_nil() {
            if let Err(e) = self.call_manager.confbridge_delete(conference.confbridge_id).await {
                warn!(
                    "⚠️ Could not delete confbridge {} of conference {}: {}",
                    conference.confbridge_id, id, e
                );
            }
        }

        if let Err(e) = self.scheduler.cancel_termination(id).await {
            warn!("⚠️ Could not cancel termination timer of conference {}: {}", id, e);
        }

        self.db
            .conference_end(id, &timestamp::now())
            .await
            .map_err(ConferenceError::Persistence)?;
        self.metrics
            .increment(CONFERENCE_CLOSE_TOTAL, conference.conference_type.as_str());

        let terminated = match self.db.conference_get(id).await {
            Ok(terminated) => terminated,
            Err(e) => {
                warn!("⚠️ Could not re-read terminated conference {}: {}", id, e);
                Conference {
                    status: ConferenceStatus::Terminated,
                    ..conference.clone()
                }
            }
        };
        self.notify_conference(WebhookEventType::ConferenceDeleted, &terminated)
            .await;

        info!("✅ Conference {} terminated", id);
        Ok(terminated)
    }
}
