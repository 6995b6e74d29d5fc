//! Engine-side data model: channels, bridges and the bridge name codec

pub mod bridge;
pub mod bridge_name;
pub mod channel;

pub use bridge::{Bridge, ConferenceType};
pub use bridge_name::BridgeMetadata;
pub use channel::{Channel, ChannelState, ChannelType, Direction, HangupReason, Tech};
