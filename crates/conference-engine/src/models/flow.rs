use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action type that moves the call into a confbridge
pub const ACTION_CONFBRIDGE_JOIN: &str = "confbridge_join";

/// Flow type used for conference routing programs
pub const FLOW_TYPE_CONFERENCE: &str = "conference";

/// One step of a call-routing program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub option: serde_json::Value,
}

impl Action {
    pub fn new(action_type: impl Into<String>, option: serde_json::Value) -> Self {
        Self {
            id: Uuid::nil(),
            action_type: action_type.into(),
            option,
        }
    }

    pub fn confbridge_join(confbridge_id: Uuid) -> Self {
        Self::new(
            ACTION_CONFBRIDGE_JOIN,
            serde_json::json!({ "confbridge_id": confbridge_id }),
        )
    }
}

/// A call-routing program owned by the flow service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: Uuid,
    #[serde(default)]
    pub customer_id: Uuid,
    #[serde(rename = "type", default)]
    pub flow_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub persist: bool,
}

/// Pre-actions, then the confbridge join, then post-actions
pub fn conference_actions(confbridge_id: Uuid, pre_actions: &[Action], post_actions: &[Action]) -> Vec<Action> {
    let mut actions = Vec::with_capacity(pre_actions.len() + post_actions.len() + 1);
    actions.extend_from_slice(pre_actions);
    actions.push(Action::confbridge_join(confbridge_id));
    actions.extend_from_slice(post_actions);
    actions
}
