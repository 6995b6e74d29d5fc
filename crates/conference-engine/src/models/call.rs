use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform call, owned by the call-manager service
///
/// Only the fields the conference engine reads or writes are modelled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub channel_id: String,
    /// Back-reference to the conference the call currently sits in, nil if none
    pub conference_id: Uuid,
    #[serde(default)]
    pub status: String,
}

impl Call {
    pub fn new(customer_id: Uuid, channel_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            channel_id: channel_id.into(),
            conference_id: Uuid::nil(),
            status: "progressing".to_string(),
        }
    }
}
