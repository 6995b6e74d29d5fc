use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ConferenceError, Result};
use crate::models::flow::conference_actions;
use crate::models::{Conference, UpdateConference};
use crate::notify::WebhookEventType;

use super::engine::ConferenceEngine;

impl ConferenceEngine {
    /// Replace a conference's name, detail, timeout and routing actions
    ///
    /// The termination timer is re-armed with the timeout the conference had
    /// before this update.
    pub async fn update(&self, id: Uuid, req: UpdateConference) -> Result<Conference> {
        let _guard = self.locks.lock(id).await;
        let conference = self.db.conference_get(id).await?;
        if conference.status.is_terminating_or_terminated() {
            return Err(ConferenceError::invalid_state(format!(
                "conference {} is {}",
                id,
                conference.status.as_str()
            )));
        }

        let previous_timeout = conference.timeout;
        let update = UpdateConference {
            timeout: self.config.clamp_timeout(req.timeout),
            ..req
        };

        let actions = conference_actions(conference.confbridge_id, &update.pre_actions, &update.post_actions);
        self.flow_manager
            .flow_update_actions(conference.flow_id, &actions)
            .await?;
        self.db
            .conference_set(id, &update)
            .await
            .map_err(ConferenceError::Persistence)?;

        let updated = self.db.conference_get(id).await?;
        self.notify_conference(WebhookEventType::ConferenceUpdated, &updated)
            .await;

        if previous_timeout > 0 {
            let delay = Duration::from_secs(u64::from(previous_timeout));
            if let Err(e) = self.scheduler.schedule_termination(id, delay).await {
                warn!("⚠️ Could not reschedule termination of conference {}: {}", id, e);
            }
        }

        info!("✅ Conference {} updated", id);
        Ok(updated)
    }
}
