//! Request envelope shared by all sibling services
//!
//! Every peer call is a JSON envelope `{ uri, method, data_type, data }` posted to the
//! service's RPC endpoint; the answer is `{ status_code, data_type, data }`.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PeerError;

use super::PeerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub uri: String,
    pub method: RequestMethod,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Sends envelopes to one sibling service over HTTP
#[derive(Debug, Clone)]
pub struct HttpRequestHandler {
    http: Client,
    endpoint: String,
}

impl HttpRequestHandler {
    /// `base_url` is the service root, e.g. `http://call-manager:8080`
    pub fn new(base_url: &str, timeout: Duration) -> PeerResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/rpc", base_url.trim_end_matches('/')),
        })
    }

    /// Send a request and decode the answer's `data`
    pub async fn send<T, R>(&self, method: RequestMethod, uri: &str, data: Option<&T>) -> PeerResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.exchange(method, uri, data).await?;
        serde_json::from_value(response.data).map_err(|e| PeerError::Decode(e.to_string()))
    }

    /// Send a request whose answer carries no data
    pub async fn send_no_content<T>(&self, method: RequestMethod, uri: &str, data: Option<&T>) -> PeerResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.exchange(method, uri, data).await.map(|_| ())
    }

    async fn exchange<T>(&self, method: RequestMethod, uri: &str, data: Option<&T>) -> PeerResult<ResponseEnvelope>
    where
        T: Serialize + ?Sized,
    {
        let (data_type, data) = match data {
            Some(data) => (
                "application/json".to_string(),
                serde_json::to_value(data).map_err(|e| PeerError::Decode(e.to_string()))?,
            ),
            None => (String::new(), serde_json::Value::Null),
        };
        let envelope = RequestEnvelope {
            uri: uri.to_string(),
            method,
            data_type,
            data,
        };
        debug!("📤 Peer request {:?} {}", method, uri);

        let response: ResponseEnvelope = self
            .http
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.status_code {
            200..=299 => Ok(response),
            404 => Err(PeerError::not_found(uri)),
            status => Err(PeerError::status(status, response.data.to_string())),
        }
    }
}
