//! In-process message bus
//!
//! Raw engine frames and webhook events fan out to any number of subscribers (audit
//! log, webhook delivery, other consumers). Publishing never blocks and never fails
//! because nobody is listening.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::trace;

use rvoip_ari_core::RawEventPublisher;

use crate::notify::WebhookEvent;

const DEFAULT_CAPACITY: usize = 1024;

/// Messages carried by the bus
#[derive(Debug, Clone)]
pub enum BusMessage {
    /// A websocket frame exactly as the engine sent it
    AriEvent { asterisk_id: String, data: Bytes },
    /// A webhook to be delivered to a customer
    Webhook(WebhookEvent),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// Publish a message; returns how many subscribers received it
    pub fn publish(&self, message: BusMessage) -> usize {
        match self.tx.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("No bus subscribers, message dropped");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RawEventPublisher for EventBus {
    async fn publish_raw_event(&self, asterisk_id: &str, data: Bytes) -> rvoip_ari_core::Result<()> {
        self.publish(BusMessage::AriEvent {
            asterisk_id: asterisk_id.to_string(),
            data,
        });
        Ok(())
    }
}
