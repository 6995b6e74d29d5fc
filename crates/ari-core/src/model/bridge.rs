//! Bridge model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bridge_name::BridgeMetadata;
use crate::event::types::AriBridge;
use crate::timestamp::DEFAULT_TIMESTAMP;

/// Conference flavour carried in a bridge name and on the conference itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConferenceType {
    #[default]
    #[serde(rename = "")]
    None,
    Conference,
    Connect,
    Echo,
    Transfer,
}

impl ConferenceType {
    /// Parse a wire value; unknown values map to `None`
    pub fn parse(value: &str) -> Self {
        match value {
            "conference" => ConferenceType::Conference,
            "connect" => ConferenceType::Connect,
            "echo" => ConferenceType::Echo,
            "transfer" => ConferenceType::Transfer,
            _ => ConferenceType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConferenceType::None => "",
            ConferenceType::Conference => "conference",
            ConferenceType::Connect => "connect",
            ConferenceType::Echo => "echo",
            ConferenceType::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for ConferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine mixing/holding construct, identified by `(asterisk_id, id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub asterisk_id: String,
    pub id: String,
    pub name: String,

    pub technology: String,
    pub bridge_type: String,
    pub bridge_class: String,
    pub creator: String,

    pub video_mode: String,
    pub video_source_id: String,

    pub channel_ids: Vec<String>,

    // decoded once from `name`
    pub conference_id: Uuid,
    pub conference_type: ConferenceType,
    pub conference_join: bool,

    pub tm_create: String,
    pub tm_update: String,
    pub tm_delete: String,
}

impl Bridge {
    /// Build a bridge from the engine snapshot carried by an event
    pub fn from_ari(asterisk_id: &str, ari: &AriBridge, timestamp: &str) -> Self {
        let metadata = BridgeMetadata::from_name(&ari.name);
        Self {
            asterisk_id: asterisk_id.to_string(),
            id: ari.id.clone(),
            name: ari.name.clone(),
            technology: ari.technology.clone(),
            bridge_type: ari.bridge_type.clone(),
            bridge_class: ari.bridge_class.clone(),
            creator: ari.creator.clone(),
            video_mode: ari.video_mode.clone(),
            video_source_id: ari.video_source_id.clone(),
            channel_ids: ari.channels.clone(),
            conference_id: metadata.conference_id,
            conference_type: metadata.conference_type,
            conference_join: metadata.join,
            tm_create: timestamp.to_string(),
            tm_update: DEFAULT_TIMESTAMP.to_string(),
            tm_delete: DEFAULT_TIMESTAMP.to_string(),
        }
    }

    pub fn metadata(&self) -> BridgeMetadata {
        BridgeMetadata {
            conference_id: self.conference_id,
            conference_type: self.conference_type,
            join: self.conference_join,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.tm_delete != DEFAULT_TIMESTAMP
    }
}
