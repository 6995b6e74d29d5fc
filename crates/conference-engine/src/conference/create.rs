use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use rvoip_ari_core::timestamp::{self, DEFAULT_TIMESTAMP};
use rvoip_ari_core::ConferenceType;

use crate::error::{ConferenceError, Result};
use crate::models::flow::{conference_actions, FLOW_TYPE_CONFERENCE};
use crate::models::{Conference, ConferenceStatus, CreateConference};
use crate::monitoring::CONFERENCE_CREATE_TOTAL;
use crate::notify::WebhookEventType;

use super::engine::ConferenceEngine;

impl ConferenceEngine {
    /// Create a conference
    ///
    /// Allocates the confbridge and the routing flow first and only then persists the
    /// conference. A failure before persistence releases whatever was already
    /// allocated; a failure after it (scheduling the timeout) is only logged.
    pub async fn create(&self, req: CreateConference) -> Result<Conference> {
        if req.conference_type == ConferenceType::None {
            return Err(ConferenceError::invalid_input("conference type is required"));
        }
        if req.customer_id.is_nil() {
            return Err(ConferenceError::invalid_input("customer id is required"));
        }

        let id = Uuid::new_v4();
        info!(
            "🏗️ Creating {} conference {} for customer {}",
            req.conference_type, id, req.customer_id
        );

        let confbridge = self
            .call_manager
            .confbridge_create(req.customer_id, req.conference_type)
            .await
            .map_err(|e| {
                error!("❌ Could not create confbridge for conference {}: {}", id, e);
                ConferenceError::from(e)
            })?;

        let actions = conference_actions(confbridge.id, &req.pre_actions, &req.post_actions);
        let flow = match self
            .flow_manager
            .flow_create(
                req.customer_id,
                FLOW_TYPE_CONFERENCE,
                &req.name,
                &req.detail,
                &actions,
                true,
            )
            .await
        {
            Ok(flow) => flow,
            Err(e) => {
                error!("❌ Could not create flow for conference {}: {}", id, e);
                self.release_confbridge(confbridge.id).await;
                return Err(e.into());
            }
        };

        let conference = Conference {
            id,
            customer_id: req.customer_id,
            conference_type: req.conference_type,
            status: ConferenceStatus::Progressing,
            name: req.name,
            detail: req.detail,
            confbridge_id: confbridge.id,
            flow_id: flow.id,
            pre_actions: req.pre_actions,
            post_actions: req.post_actions,
            timeout: self.config.clamp_timeout(req.timeout),
            call_ids: Vec::new(),
            recording_id: Uuid::nil(),
            recording_ids: Vec::new(),
            tm_create: timestamp::now(),
            tm_update: DEFAULT_TIMESTAMP.to_string(),
            tm_delete: DEFAULT_TIMESTAMP.to_string(),
        };

        if let Err(e) = self.db.conference_create(&conference).await {
            error!("❌ Could not persist conference {}: {}", id, e);
            self.release_flow(flow.id).await;
            self.release_confbridge(confbridge.id).await;
            return Err(ConferenceError::Persistence(e));
        }
        self.metrics
            .increment(CONFERENCE_CREATE_TOTAL, conference.conference_type.as_str());

        let created = match self.db.conference_get(id).await {
            Ok(created) => created,
            Err(e) => {
                warn!("⚠️ Could not re-read created conference {}: {}", id, e);
                conference
            }
        };
        self.notify_conference(WebhookEventType::ConferenceCreated, &created)
            .await;

        if created.timeout > 0 {
            let delay = Duration::from_secs(u64::from(created.timeout));
            if let Err(e) = self.scheduler.schedule_termination(id, delay).await {
                warn!("⚠️ Could not schedule termination of conference {}: {}", id, e);
            }
        }

        info!("✅ Conference {} created", id);
        Ok(created)
    }

    async fn release_confbridge(&self, confbridge_id: Uuid) {
        if let Err(e) = self.call_manager.confbridge_delete(confbridge_id).await {
            warn!("⚠️ Could not release confbridge {}: {}", confbridge_id, e);
        }
    }

    async fn release_flow(&self, flow_id: Uuid) {
        if let Err(e) = self.flow_manager.flow_delete(flow_id).await {
            warn!("⚠️ Could not release flow {}: {}", flow_id, e);
        }
    }
}
