//! # rvoip-ari-core
//!
//! Everything that speaks the Asterisk REST Interface (ARI) for the rvoip conference
//! platform:
//!
//! - [`model`]: channel and bridge snapshots, including the bridge name codec that
//!   carries conference metadata
//! - [`event`]: decoding of websocket frames into a closed [`event::Event`] enum
//! - [`client`]: the [`client::AriCommands`] seam and its REST implementation
//! - [`connector`]: the reconnecting websocket reader
//! - [`timestamp`]: canonical platform timestamps
//!
//! The crate holds no business logic; the conference engine consumes it.

pub mod client;
pub mod connector;
pub mod error;
pub mod event;
pub mod model;
pub mod timestamp;

pub use client::{AriCommands, AriRestClient};
pub use connector::{
    AriConnector, ConnectionState, ConnectorConfig, EventHandler, FrameOutcome, HandlerError,
    RawEventPublisher,
};
pub use error::{AriError, DecodeError, Result};
pub use event::{decode, Event, EventType};
pub use model::{
    Bridge, BridgeMetadata, Channel, ChannelState, ChannelType, ConferenceType, Direction,
    HangupReason, Tech,
};

/// Convenience re-exports
pub mod prelude {
    pub use crate::client::AriCommands;
    pub use crate::connector::{EventHandler, RawEventPublisher};
    pub use crate::error::{AriError, DecodeError};
    pub use crate::event::{Event, EventType};
    pub use crate::model::*;
    pub use crate::timestamp;
}
