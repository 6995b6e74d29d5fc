//! Bridge name codec
//!
//! The engine has no metadata field on bridges, so the platform writes its own metadata
//! into the bridge name as a comma separated `key=value` list, e.g.
//! `conference_id=2f1b..,conference_type=conference,join=false`.
//!
//! Decoding is forgiving: other engine subsystems create bridges with arbitrary names,
//! so unknown keys are ignored and malformed entries are skipped.

use std::collections::HashMap;

use uuid::Uuid;

use super::bridge::ConferenceType;

pub const KEY_CONFERENCE_ID: &str = "conference_id";
pub const KEY_CONFERENCE_TYPE: &str = "conference_type";
pub const KEY_JOIN: &str = "join";

/// Encode platform metadata into a bridge name
pub fn encode(conference_id: Uuid, conference_type: ConferenceType, join: bool) -> String {
    format!(
        "{}={},{}={},{}={}",
        KEY_CONFERENCE_ID,
        conference_id,
        KEY_CONFERENCE_TYPE,
        conference_type.as_str(),
        KEY_JOIN,
        join
    )
}

/// Split a bridge name into its `key=value` entries
///
/// Entries that do not contain exactly one `=` are dropped.
pub fn decode(name: &str) -> HashMap<String, String> {
    let mut res = HashMap::new();
    for item in name.split(',') {
        let mut parts = item.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        res.insert(key.to_string(), value.to_string());
    }
    res
}

/// Typed view of the metadata carried in a bridge name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeMetadata {
    pub conference_id: Uuid,
    pub conference_type: ConferenceType,
    pub join: bool,
}

impl BridgeMetadata {
    /// Parse a bridge name; absent or unparsable keys yield zero values
    pub fn from_name(name: &str) -> Self {
        let values = decode(name);

        let conference_id = values
            .get(KEY_CONFERENCE_ID)
            .and_then(|v| Uuid::parse_str(v).ok())
            .unwrap_or_else(Uuid::nil);
        let conference_type = values
            .get(KEY_CONFERENCE_TYPE)
            .map(|v| ConferenceType::parse(v))
            .unwrap_or_default();
        let join = values
            .get(KEY_JOIN)
            .map(|v| v == "true")
            .unwrap_or(false);

        Self {
            conference_id,
            conference_type,
            join,
        }
    }

    pub fn to_name(&self) -> String {
        encode(self.conference_id, self.conference_type, self.join)
    }
}
