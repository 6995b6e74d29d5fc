use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use rvoip_ari_core::ConferenceType;

use crate::models::{Call, Confbridge};

use super::request::{HttpRequestHandler, RequestMethod};
use super::{CallManager, PeerResult};

/// Typed client of the call-manager service
#[derive(Debug, Clone)]
pub struct CallManagerClient {
    request: HttpRequestHandler,
}

impl CallManagerClient {
    pub fn new(request: HttpRequestHandler) -> Self {
        Self { request }
    }
}

#[async_trait]
impl CallManager for CallManagerClient {
    async fn confbridge_create(&self, customer_id: Uuid, confbridge_type: ConferenceType) -> PeerResult<Confbridge> {
        let data = json!({ "customer_id": customer_id, "type": confbridge_type });
        self.request
            .send(RequestMethod::Post, "/v1/confbridges", Some(&data))
            .await
    }

    async fn confbridge_get(&self, id: Uuid) -> PeerResult<Confbridge> {
        self.request
            .send::<(), _>(RequestMethod::Get, &format!("/v1/confbridges/{}", id), None)
            .await
    }

    async fn confbridge_delete(&self, id: Uuid) -> PeerResult<()> {
        self.request
            .send_no_content::<()>(RequestMethod::Delete, &format!("/v1/confbridges/{}", id), None)
            .await
    }

    async fn confbridge_call_add(&self, id: Uuid, call_id: Uuid) -> PeerResult<()> {
        self.request
            .send_no_content::<()>(
                RequestMethod::Post,
                &format!("/v1/confbridges/{}/calls/{}", id, call_id),
                None,
            )
            .await
    }

    async fn confbridge_call_kick(&self, id: Uuid, call_id: Uuid) -> PeerResult<()> {
        self.request
            .send_no_content::<()>(
                RequestMethod::Delete,
                &format!("/v1/confbridges/{}/calls/{}", id, call_id),
                None,
            )
            .await
    }

    async fn call_get_by_channel_id(&self, channel_id: &str) -> PeerResult<Call> {
        self.request
            .send::<(), _>(RequestMethod::Get, &format!("/v1/channels/{}/call", channel_id), None)
            .await
    }

    async fn call_update_conference_id(&self, call_id: Uuid, conference_id: Uuid) -> PeerResult<()> {
        let data = json!({ "conference_id": conference_id });
        self.request
            .send_no_content(
                RequestMethod::Put,
                &format!("/v1/calls/{}/conference_id", call_id),
                Some(&data),
            )
            .await
    }
}
