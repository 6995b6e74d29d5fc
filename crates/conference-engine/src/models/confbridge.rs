use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rvoip_ari_core::ConferenceType;

/// Conference mixing resource allocated by the call-manager service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confbridge {
    pub id: Uuid,
    #[serde(default)]
    pub customer_id: Uuid,
    #[serde(rename = "type", default)]
    pub confbridge_type: ConferenceType,
    /// Engine instance hosting the bridge
    #[serde(default)]
    pub asterisk_id: String,
    /// Engine bridge backing this confbridge
    #[serde(default)]
    pub bridge_id: String,
}
