use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::models::{Action, Flow};

use super::request::{HttpRequestHandler, RequestMethod};
use super::{FlowManager, PeerResult};

/// Typed client of the flow-manager service
#[derive(Debug, Clone)]
pub struct FlowManagerClient {
    request: HttpRequestHandler,
}

impl FlowManagerClient {
    pub fn new(request: HttpRequestHandler) -> Self {
        Self { request }
    }
}

#[async_trait]
impl FlowManager for FlowManagerClient {
    async fn flow_create(
        &self,
        customer_id: Uuid,
        flow_type: &str,
        name: &str,
        detail: &str,
        actions: &[Action],
        persist: bool,
    ) -> PeerResult<Flow> {
        let data = json!({
            "customer_id": customer_id,
            "type": flow_type,
            "name": name,
            "detail": detail,
            "actions": actions,
            "persist": persist,
        });
        self.request
            .send(RequestMethod::Post, "/v1/flows", Some(&data))
            .await
    }

    async fn flow_get(&self, id: Uuid) -> PeerResult<Flow> {
        self.request
            .send::<(), _>(RequestMethod::Get, &format!("/v1/flows/{}", id), None)
            .await
    }

    async fn flow_update_actions(&self, id: Uuid, actions: &[Action]) -> PeerResult<Flow> {
        let data = json!({ "actions": actions });
        self.request
            .send(RequestMethod::Put, &format!("/v1/flows/{}/actions", id), Some(&data))
            .await
    }

    async fn flow_delete(&self, id: Uuid) -> PeerResult<()> {
        self.request
            .send_no_content::<()>(RequestMethod::Delete, &format!("/v1/flows/{}", id), None)
            .await
    }
}
