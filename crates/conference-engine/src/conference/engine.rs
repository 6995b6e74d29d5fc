use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use rvoip_ari_core::timestamp::DEFAULT_TIMESTAMP;
use rvoip_ari_core::AriCommands;

use crate::config::ConferenceConfig;
use crate::database::Repository;
use crate::error::Result;
use crate::models::Conference;
use crate::monitoring::MetricsSink;
use crate::notify::{self, NotifyHandler, WebhookEventType};
use crate::peers::{CallManager, FlowManager, TerminationScheduler};

use super::locks::ConferenceLocks;

/// Collaborators the engine talks to
#[derive(Clone)]
pub struct EngineDependencies {
    pub db: Arc<dyn Repository>,
    pub ari: Arc<dyn AriCommands>,
    pub call_manager: Arc<dyn CallManager>,
    pub flow_manager: Arc<dyn FlowManager>,
    pub scheduler: Arc<dyn TerminationScheduler>,
    pub notify: Arc<dyn NotifyHandler>,
    pub metrics: Arc<dyn MetricsSink>,
}

/// Conference state machine
///
/// Owns the conference lifecycle (`starting → progressing → terminating → terminated`)
/// and coordinates the confbridge and flow peers. Operations that modify an existing
/// conference hold its [`ConferenceLocks`] entry for their whole duration.
pub struct ConferenceEngine {
    pub(super) config: ConferenceConfig,
    pub(super) db: Arc<dyn Repository>,
    pub(super) ari: Arc<dyn AriCommands>,
    pub(super) call_manager: Arc<dyn CallManager>,
    pub(super) flow_manager: Arc<dyn FlowManager>,
    pub(super) scheduler: Arc<dyn TerminationScheduler>,
    pub(super) notify: Arc<dyn NotifyHandler>,
    pub(super) metrics: Arc<dyn MetricsSink>,
    pub(super) locks: ConferenceLocks,
}

impl ConferenceEngine {
    pub fn new(config: ConferenceConfig, deps: EngineDependencies) -> Arc<Self> {
        info!("✅ Conference engine initialized");
        Arc::new(Self {
            config,
            db: deps.db,
            ari: deps.ari,
            call_manager: deps.call_manager,
            flow_manager: deps.flow_manager,
            scheduler: deps.scheduler,
            notify: deps.notify,
            metrics: deps.metrics,
            locks: ConferenceLocks::new(),
        })
    }

    pub fn config(&self) -> &ConferenceConfig {
        &self.config
    }

    pub fn locks(&self) -> &ConferenceLocks {
        &self.locks
    }

    pub async fn get(&self, id: Uuid) -> Result<Conference> {
        Ok(self.db.conference_get(id).await?)
    }

    /// A page of a customer's conferences, newest first
    ///
    /// `page_token` is the `tm_create` of the last conference of the previous page.
    pub async fn list(&self, customer_id: Uuid, page_size: usize, page_token: Option<&str>) -> Result<Vec<Conference>> {
        let token = match page_token {
            Some(token) if !token.is_empty() => token,
            _ => DEFAULT_TIMESTAMP,
        };
        Ok(self.db.conference_list(customer_id, page_size, token).await?)
    }

    pub(super) async fn notify_conference(&self, event_type: WebhookEventType, conference: &Conference) {
        notify::publish(
            self.notify.as_ref(),
            conference.customer_id,
            event_type,
            &conference.to_webhook(),
        )
        .await;
    }

    pub(super) async fn notify_payload<T: Serialize + Sync>(&self, customer_id: Uuid, event_type: WebhookEventType, payload: &T) {
        notify::publish(self.notify.as_ref(), customer_id, event_type, payload).await;
    }
}
