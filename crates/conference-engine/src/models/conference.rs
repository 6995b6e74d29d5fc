use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rvoip_ari_core::timestamp::DEFAULT_TIMESTAMP;
use rvoip_ari_core::ConferenceType;

use super::flow::Action;

/// Conference lifecycle state; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConferenceStatus {
    Starting,
    Progressing,
    Terminating,
    Terminated,
}

impl ConferenceStatus {
    /// True once termination has begun
    pub fn is_terminating_or_terminated(&self) -> bool {
        matches!(self, Self::Terminating | Self::Terminated)
    }

    pub fn can_transition_to(&self, next: ConferenceStatus) -> bool {
        next > *self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Progressing => "progressing",
            Self::Terminating => "terminating",
            Self::Terminated => "terminated",
        }
    }
}

/// The durable conference entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[serde(rename = "type")]
    pub conference_type: ConferenceType,
    pub status: ConferenceStatus,

    pub name: String,
    pub detail: String,

    pub confbridge_id: Uuid,
    pub flow_id: Uuid,

    pub pre_actions: Vec<Action>,
    pub post_actions: Vec<Action>,

    /// Seconds until automatic termination, 0 for none
    pub timeout: u32,

    pub call_ids: Vec<Uuid>,

    pub recording_id: Uuid,
    pub recording_ids: Vec<Uuid>,

    pub tm_create: String,
    pub tm_update: String,
    pub tm_delete: String,
}

impl Conference {
    pub fn is_recording(&self) -> bool {
        !self.recording_id.is_nil()
    }

    pub fn is_deleted(&self) -> bool {
        self.tm_delete != DEFAULT_TIMESTAMP
    }

    /// Payload published with conference webhooks
    pub fn to_webhook(&self) -> ConferenceWebhook {
        ConferenceWebhook {
            id: self.id,
            conference_type: self.conference_type,
            status: self.status,
            name: self.name.clone(),
            detail: self.detail.clone(),
            pre_actions: self.pre_actions.clone(),
            post_actions: self.post_actions.clone(),
            call_ids: self.call_ids.clone(),
            recording_id: self.recording_id,
            recording_ids: self.recording_ids.clone(),
            timeout: self.timeout,
            tm_create: self.tm_create.clone(),
            tm_update: self.tm_update.clone(),
            tm_delete: self.tm_delete.clone(),
        }
    }
}

/// Externally visible view of a conference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceWebhook {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub conference_type: ConferenceType,
    pub status: ConferenceStatus,
    pub name: String,
    pub detail: String,
    pub pre_actions: Vec<Action>,
    pub post_actions: Vec<Action>,
    pub call_ids: Vec<Uuid>,
    pub recording_id: Uuid,
    pub recording_ids: Vec<Uuid>,
    pub timeout: u32,
    pub tm_create: String,
    pub tm_update: String,
    pub tm_delete: String,
}

/// Parameters of a new conference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConference {
    #[serde(rename = "type")]
    pub conference_type: ConferenceType,
    pub customer_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub pre_actions: Vec<Action>,
    #[serde(default)]
    pub post_actions: Vec<Action>,
}

/// Mutable fields of an existing conference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConference {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub pre_actions: Vec<Action>,
    #[serde(default)]
    pub post_actions: Vec<Action>,
}
