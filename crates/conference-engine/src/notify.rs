//! Webhook notifications
//!
//! The engine emits a webhook at each lifecycle transition. Delivery is fire-and-forget:
//! the engine never waits for, or reacts to, the outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::bus::{BusMessage, EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    ConferenceCreated,
    ConferenceUpdated,
    ConferenceDeleted,
    RecordingStarted,
    RecordingFinished,
}

impl WebhookEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConferenceCreated => "conference_created",
            Self::ConferenceUpdated => "conference_updated",
            Self::ConferenceDeleted => "conference_deleted",
            Self::RecordingStarted => "recording_started",
            Self::RecordingFinished => "recording_finished",
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub customer_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    pub data: serde_json::Value,
}

#[async_trait]
pub trait NotifyHandler: Send + Sync {
    async fn publish_webhook_event(&self, customer_id: Uuid, event_type: WebhookEventType, data: serde_json::Value);
}

/// Serialize `payload` and hand it to the notifier
pub async fn publish<T: Serialize + Sync>(
    notify: &dyn NotifyHandler,
    customer_id: Uuid,
    event_type: WebhookEventType,
    payload: &T,
) {
    match serde_json::to_value(payload) {
        Ok(data) => notify.publish_webhook_event(customer_id, event_type, data).await,
        Err(e) => tracing::warn!("⚠️ Could not serialize {} webhook: {}", event_type, e),
    }
}

/// Notifier that puts webhook events on the message bus
#[derive(Debug, Clone)]
pub struct BusNotifier {
    bus: EventBus,
}

impl BusNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl NotifyHandler for BusNotifier {
    async fn publish_webhook_event(&self, customer_id: Uuid, event_type: WebhookEventType, data: serde_json::Value) {
        debug!("📨 Publishing {} webhook for customer {}", event_type, customer_id);
        self.bus.publish(BusMessage::Webhook(WebhookEvent {
            customer_id,
            event_type,
            data,
        }));
    }
}
