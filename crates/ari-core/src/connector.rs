//! Reconnecting websocket session to one engine instance
//!
//! The connector reads frames one at a time. Each frame is republished verbatim to the
//! [`RawEventPublisher`] and then decoded and handed to the [`EventHandler`], so events
//! from a single engine instance are always processed in arrival order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::error::{AriError, DecodeError, Result};
use crate::event::{self, Event};

/// Error type returned by event handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer of decoded events
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> std::result::Result<(), HandlerError>;
}

/// Outbound bus receiving every raw frame for audit and fan-out
#[async_trait]
pub trait RawEventPublisher: Send + Sync {
    async fn publish_raw_event(&self, asterisk_id: &str, data: Bytes) -> Result<()>;
}

/// Connector session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What happened to a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Decoded and handled successfully
    Dispatched,
    /// Decoded, but the handler returned an error
    HandlerFailed,
    /// Not decodable or not a consumed event type
    Dropped,
}

/// Connector settings for one engine instance
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Label used when the frame itself does not say which engine sent it
    pub asterisk_id: String,
    /// Full websocket url, including `app` and credentials query parameters
    pub url: String,
    pub reconnect_delay: Duration,
}

impl ConnectorConfig {
    pub fn new(asterisk_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            asterisk_id: asterisk_id.into(),
            url: url.into(),
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Long-lived websocket reader for one engine instance
pub struct AriConnector {
    config: ConnectorConfig,
    handler: Arc<dyn EventHandler>,
    publisher: Arc<dyn RawEventPublisher>,
    state_tx: watch::Sender<ConnectionState>,
}

impl AriConnector {
    pub fn new(
        config: ConnectorConfig,
        handler: Arc<dyn EventHandler>,
        publisher: Arc<dyn RawEventPublisher>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            handler,
            publisher,
            state_tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    /// Run forever: connect, read until the session breaks, reconnect
    pub async fn run(&self) {
        info!("🚀 Starting ARI connector for {} ({})", self.config.asterisk_id, self.config.url);
        loop {
            self.set_state(ConnectionState::Connecting);
            match connect_async(self.config.url.as_str()).await {
                Ok((stream, _response)) => {
                    self.set_state(ConnectionState::Connected);
                    info!("✅ Connected to ARI websocket of {}", self.config.asterisk_id);

                    if let Err(e) = self.read_loop(stream).await {
                        warn!("⚠️ ARI websocket of {} failed: {}", self.config.asterisk_id, e);
                    }
                    self.set_state(ConnectionState::Disconnected);
                    info!("🔌 Disconnected from ARI websocket of {}", self.config.asterisk_id);
                }
                Err(e) => {
                    self.set_state(ConnectionState::Disconnected);
                    warn!(
                        "❌ Could not connect to ARI websocket of {}: {}. Retrying in {:?}",
                        self.config.asterisk_id, e, self.config.reconnect_delay
                    );
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
            }
        }
    }

    async fn read_loop(&self, mut stream: WsStream) -> Result<()> {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    self.process_frame(Bytes::from(text.into_bytes())).await;
                }
                Ok(Message::Binary(data)) => {
                    self.process_frame(Bytes::from(data)).await;
                }
                Ok(Message::Close(frame)) => {
                    debug!("ARI websocket of {} closed by peer: {:?}", self.config.asterisk_id, frame);
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = stream.close(None).await;
                    return Err(AriError::websocket(e.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Publish, decode and dispatch a single frame
    pub async fn process_frame(&self, data: Bytes) -> FrameOutcome {
        if let Err(e) = self
            .publisher
            .publish_raw_event(&self.config.asterisk_id, data.clone())
            .await
        {
            warn!("⚠️ Could not publish ARI frame from {}: {}", self.config.asterisk_id, e);
        }

        let event = match event::decode(&data) {
            Ok(event) => event,
            Err(DecodeError::UnsupportedType(event_type)) => {
                debug!("Dropping unsupported ARI event type {}", event_type);
                return FrameOutcome::Dropped;
            }
            Err(e) => {
                warn!("⚠️ Could not decode ARI frame from {}: {}", self.config.asterisk_id, e);
                return FrameOutcome::Dropped;
            }
        };

        let event_type = event.event_type();
        match self.handler.handle_event(event).await {
            Ok(()) => FrameOutcome::Dispatched,
            Err(e) => {
                error!("❌ Failed to handle ARI event {}: {}", event_type, e);
                FrameOutcome::HandlerFailed
            }
        }
    }
}
