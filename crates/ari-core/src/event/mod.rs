//! Engine event decoding
//!
//! Frames from the engine websocket are JSON objects with a `type` discriminator. The
//! decoder turns a frame into exactly one [`Event`] variant or a [`DecodeError`], and
//! rewrites the event timestamp into the canonical platform layout on the way.
//!
//! ```
//! use rvoip_ari_core::event::{decode, Event};
//!
//! let frame = br#"{
//!     "type": "BridgeDestroyed",
//!     "application": "voipbin",
//!     "asterisk_id": "42:01:0a:a4:00:05",
//!     "timestamp": "2020-04-19T14:38:00.363+0000",
//!     "bridge": {"id": "b1", "name": "echo"}
//! }"#;
//!
//! match decode(frame).unwrap() {
//!     Event::BridgeDestroyed(e) => assert_eq!(e.header.timestamp, "2020-04-19 14:38:00.363000"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod types;

use serde::Deserialize;

use crate::error::DecodeError;
use crate::timestamp;

pub use types::*;

/// Every event type the platform consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    ChannelCreated,
    ChannelDestroyed,
    ChannelEnteredBridge,
    ChannelLeftBridge,
    ChannelVarset,
    ChannelStateChange,
    ChannelDtmfReceived,
    BridgeCreated,
    BridgeDestroyed,
    PlaybackStarted,
    PlaybackFinished,
    RecordingStarted,
    RecordingFinished,
    StasisStart,
}

impl EventType {
    pub const ALL: [EventType; 14] = [
        EventType::ChannelCreated,
        EventType::ChannelDestroyed,
        EventType::ChannelEnteredBridge,
        EventType::ChannelLeftBridge,
        EventType::ChannelVarset,
        EventType::ChannelStateChange,
        EventType::ChannelDtmfReceived,
        EventType::BridgeCreated,
        EventType::BridgeDestroyed,
        EventType::PlaybackStarted,
        EventType::PlaybackFinished,
        EventType::RecordingStarted,
        EventType::RecordingFinished,
        EventType::StasisStart,
    ];

    /// Look up a wire `type` tag
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ChannelCreated => "ChannelCreated",
            EventType::ChannelDestroyed => "ChannelDestroyed",
            EventType::ChannelEnteredBridge => "ChannelEnteredBridge",
            EventType::ChannelLeftBridge => "ChannelLeftBridge",
            EventType::ChannelVarset => "ChannelVarset",
            EventType::ChannelStateChange => "ChannelStateChange",
            EventType::ChannelDtmfReceived => "ChannelDtmfReceived",
            EventType::BridgeCreated => "BridgeCreated",
            EventType::BridgeDestroyed => "BridgeDestroyed",
            EventType::PlaybackStarted => "PlaybackStarted",
            EventType::PlaybackFinished => "PlaybackFinished",
            EventType::RecordingStarted => "RecordingStarted",
            EventType::RecordingFinished => "RecordingFinished",
            EventType::StasisStart => "StasisStart",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded engine event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ChannelCreated(ChannelCreated),
    ChannelDestroyed(ChannelDestroyed),
    ChannelEnteredBridge(ChannelEnteredBridge),
    ChannelLeftBridge(ChannelLeftBridge),
    ChannelVarset(ChannelVarset),
    ChannelStateChange(ChannelStateChange),
    ChannelDtmfReceived(ChannelDtmfReceived),
    BridgeCreated(BridgeCreated),
    BridgeDestroyed(BridgeDestroyed),
    PlaybackStarted(PlaybackStarted),
    PlaybackFinished(PlaybackFinished),
    RecordingStarted(RecordingStarted),
    RecordingFinished(RecordingFinished),
    StasisStart(StasisStart),
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::ChannelCreated(_) => EventType::ChannelCreated,
            Event::ChannelDestroyed(_) => EventType::ChannelDestroyed,
            Event::ChannelEnteredBridge(_) => EventType::ChannelEnteredBridge,
            Event::ChannelLeftBridge(_) => EventType::ChannelLeftBridge,
            Event::ChannelVarset(_) => EventType::ChannelVarset,
            Event::ChannelStateChange(_) => EventType::ChannelStateChange,
            Event::ChannelDtmfReceived(_) => EventType::ChannelDtmfReceived,
            Event::BridgeCreated(_) => EventType::BridgeCreated,
            Event::BridgeDestroyed(_) => EventType::BridgeDestroyed,
            Event::PlaybackStarted(_) => EventType::PlaybackStarted,
            Event::PlaybackFinished(_) => EventType::PlaybackFinished,
            Event::RecordingStarted(_) => EventType::RecordingStarted,
            Event::RecordingFinished(_) => EventType::RecordingFinished,
            Event::StasisStart(_) => EventType::StasisStart,
        }
    }

    pub fn header(&self) -> &EventHeader {
        match self {
            Event::ChannelCreated(e) => &e.header,
            Event::ChannelDestroyed(e) => &e.header,
            Event::ChannelEnteredBridge(e) => &e.header,
            Event::ChannelLeftBridge(e) => &e.header,
            Event::ChannelVarset(e) => &e.header,
            Event::ChannelStateChange(e) => &e.header,
            Event::ChannelDtmfReceived(e) => &e.header,
            Event::BridgeCreated(e) => &e.header,
            Event::BridgeDestroyed(e) => &e.header,
            Event::PlaybackStarted(e) => &e.header,
            Event::PlaybackFinished(e) => &e.header,
            Event::RecordingStarted(e) => &e.header,
            Event::RecordingFinished(e) => &e.header,
            Event::StasisStart(e) => &e.header,
        }
    }

    fn header_mut(&mut self) -> &mut EventHeader {
        match self {
            Event::ChannelCreated(e) => &mut e.header,
            Event::ChannelDestroyed(e) => &mut e.header,
            Event::ChannelEnteredBridge(e) => &mut e.header,
            Event::ChannelLeftBridge(e) => &mut e.header,
            Event::ChannelVarset(e) => &mut e.header,
            Event::ChannelStateChange(e) => &mut e.header,
            Event::ChannelDtmfReceived(e) => &mut e.header,
            Event::BridgeCreated(e) => &mut e.header,
            Event::BridgeDestroyed(e) => &mut e.header,
            Event::PlaybackStarted(e) => &mut e.header,
            Event::PlaybackFinished(e) => &mut e.header,
            Event::RecordingStarted(e) => &mut e.header,
            Event::RecordingFinished(e) => &mut e.header,
            Event::StasisStart(e) => &mut e.header,
        }
    }

    pub fn asterisk_id(&self) -> &str {
        &self.header().asterisk_id
    }

    /// Canonical timestamp of the event
    pub fn timestamp(&self) -> &str {
        &self.header().timestamp
    }
}

#[derive(Deserialize)]
struct TypeTag {
    #[serde(rename = "type")]
    event_type: String,
}

/// Decode a frame, reading the discriminator from the payload itself
pub fn decode(data: &[u8]) -> Result<Event, DecodeError> {
    let tag: TypeTag = serde_json::from_slice(data)?;
    decode_as(&tag.event_type, data)
}

/// Decode a frame whose `type` tag is already known
pub fn decode_as(tag: &str, data: &[u8]) -> Result<Event, DecodeError> {
    let event_type =
        EventType::parse(tag).ok_or_else(|| DecodeError::UnsupportedType(tag.to_string()))?;

    let mut event = match event_type {
        EventType::ChannelCreated => Event::ChannelCreated(serde_json::from_slice(data)?),
        EventType::ChannelDestroyed => Event::ChannelDestroyed(serde_json::from_slice(data)?),
        EventType::ChannelEnteredBridge => {
            Event::ChannelEnteredBridge(serde_json::from_slice(data)?)
        }
        EventType::ChannelLeftBridge => Event::ChannelLeftBridge(serde_json::from_slice(data)?),
        EventType::ChannelVarset => Event::ChannelVarset(serde_json::from_slice(data)?),
        EventType::ChannelStateChange => Event::ChannelStateChange(serde_json::from_slice(data)?),
        EventType::ChannelDtmfReceived => {
            Event::ChannelDtmfReceived(serde_json::from_slice(data)?)
        }
        EventType::BridgeCreated => Event::BridgeCreated(serde_json::from_slice(data)?),
        EventType::BridgeDestroyed => Event::BridgeDestroyed(serde_json::from_slice(data)?),
        EventType::PlaybackStarted => Event::PlaybackStarted(serde_json::from_slice(data)?),
        EventType::PlaybackFinished => Event::PlaybackFinished(serde_json::from_slice(data)?),
        EventType::RecordingStarted => Event::RecordingStarted(serde_json::from_slice(data)?),
        EventType::RecordingFinished => Event::RecordingFinished(serde_json::from_slice(data)?),
        EventType::StasisStart => Event::StasisStart(serde_json::from_slice(data)?),
    };

    let header = event.header_mut();
    header.timestamp = timestamp::from_wire(&header.timestamp)?;
    Ok(event)
}
