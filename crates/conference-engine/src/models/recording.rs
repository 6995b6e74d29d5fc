use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rvoip_ari_core::timestamp::DEFAULT_TIMESTAMP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Initiating,
    Recording,
    Stopping,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingReferenceType {
    Conference,
    Call,
}

/// A recording of a conference mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub reference_type: RecordingReferenceType,
    pub reference_id: Uuid,
    pub status: RecordingStatus,
    pub format: String,

    /// Engine instance and live recording name
    pub asterisk_id: String,
    pub recording_name: String,
    pub filename: String,

    pub tm_start: String,
    pub tm_end: String,
    pub tm_create: String,
    pub tm_update: String,
}

impl Recording {
    pub fn for_conference(
        customer_id: Uuid,
        conference_id: Uuid,
        asterisk_id: &str,
        format: &str,
        now: &str,
    ) -> Self {
        let id = Uuid::new_v4();
        let recording_name = format!("conference_{}_{}", conference_id, id);
        Self {
            id,
            customer_id,
            reference_type: RecordingReferenceType::Conference,
            reference_id: conference_id,
            status: RecordingStatus::Initiating,
            format: format.to_string(),
            asterisk_id: asterisk_id.to_string(),
            filename: format!("{}.{}", recording_name, format),
            recording_name,
            tm_start: DEFAULT_TIMESTAMP.to_string(),
            tm_end: DEFAULT_TIMESTAMP.to_string(),
            tm_create: now.to_string(),
            tm_update: DEFAULT_TIMESTAMP.to_string(),
        }
    }
}
