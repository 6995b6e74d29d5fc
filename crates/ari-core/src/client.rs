//! Engine command interface
//!
//! [`AriCommands`] is the seam the platform uses to drive the engine; [`AriRestClient`]
//! implements it over the ARI REST API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::debug;

use crate::error::{AriError, Result};
use crate::model::HangupReason;

/// Commands issued to the engine, addressed per `(asterisk_id, object id)`
#[async_trait]
pub trait AriCommands: Send + Sync {
    async fn channel_hangup(&self, asterisk_id: &str, channel_id: &str, reason: HangupReason) -> Result<()>;

    async fn channel_answer(&self, asterisk_id: &str, channel_id: &str) -> Result<()>;

    /// Dial a created channel; `timeout_secs == 0` leaves the engine default
    async fn channel_dial(&self, asterisk_id: &str, channel_id: &str, caller: &str, timeout_secs: u32) -> Result<()>;

    async fn channel_variable_set(&self, asterisk_id: &str, channel_id: &str, name: &str, value: &str) -> Result<()>;

    async fn bridge_add_channel(&self, asterisk_id: &str, bridge_id: &str, channel_id: &str) -> Result<()>;

    async fn bridge_remove_channel(&self, asterisk_id: &str, bridge_id: &str, channel_id: &str) -> Result<()>;

    async fn bridge_delete(&self, asterisk_id: &str, bridge_id: &str) -> Result<()>;

    /// Start a live recording of a bridge under the given name
    async fn bridge_record(
        &self,
        asterisk_id: &str,
        bridge_id: &str,
        name: &str,
        format: &str,
        max_duration_secs: u32,
    ) -> Result<()>;

    async fn recording_stop(&self, asterisk_id: &str, name: &str) -> Result<()>;
}

/// ARI REST implementation of [`AriCommands`]
#[derive(Debug, Clone)]
pub struct AriRestClient {
    http: Client,
    username: String,
    password: String,
    endpoints: HashMap<String, String>,
    default_endpoint: Option<String>,
}

impl AriRestClient {
    /// Create a client with the given basic-auth credentials and request timeout
    pub fn new(username: impl Into<String>, password: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            username: username.into(),
            password: password.into(),
            endpoints: HashMap::new(),
            default_endpoint: None,
        })
    }

    /// Register the REST base url (e.g. `http://10.164.0.5:8088/ari`) of an engine instance
    pub fn with_endpoint(mut self, asterisk_id: impl Into<String>, rest_url: impl Into<String>) -> Self {
        let url = rest_url.into().trim_end_matches('/').to_string();
        if self.default_endpoint.is_none() {
            self.default_endpoint = Some(url.clone());
        }
        self.endpoints.insert(asterisk_id.into(), url);
        self
    }

    /// Base url used for engine ids that were never registered
    pub fn with_default_endpoint(mut self, rest_url: impl Into<String>) -> Self {
        self.default_endpoint = Some(rest_url.into().trim_end_matches('/').to_string());
        self
    }

    fn url(&self, asterisk_id: &str, path: &str) -> Result<String> {
        let base = self
            .endpoints
            .get(asterisk_id)
            .or(self.default_endpoint.as_ref())
            .ok_or_else(|| AriError::UnknownAsterisk(asterisk_id.to_string()))?;
        Ok(format!("{}{}", base, path))
    }

    fn request(&self, method: Method, asterisk_id: &str, path: &str) -> Result<RequestBuilder> {
        let url = self.url(asterisk_id, path)?;
        Ok(self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password)))
    }

    async fn execute(&self, request: RequestBuilder, target: &str) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AriError::not_found(target));
        }
        let body = response.text().await.unwrap_or_default();
        Err(AriError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl AriCommands for AriRestClient {
    async fn channel_hangup(&self, asterisk_id: &str, channel_id: &str, reason: HangupReason) -> Result<()> {
        debug!("📞 Hanging up channel {} on {} ({})", channel_id, asterisk_id, reason);
        let request = self
            .request(Method::DELETE, asterisk_id, &format!("/channels/{}", channel_id))?
            .query(&[("reason", reason.as_str())]);
        self.execute(request, &format!("channel {}", channel_id)).await
    }

    async fn channel_answer(&self, asterisk_id: &str, channel_id: &str) -> Result<()> {
        let request = self.request(Method::POST, asterisk_id, &format!("/channels/{}/answer", channel_id))?;
        self.execute(request, &format!("channel {}", channel_id)).await
    }

    async fn channel_dial(&self, asterisk_id: &str, channel_id: &str, caller: &str, timeout_secs: u32) -> Result<()> {
        let mut request = self.request(Method::POST, asterisk_id, &format!("/channels/{}/dial", channel_id))?;
        if !caller.is_empty() {
            request = request.query(&[("caller", caller)]);
        }
        if timeout_secs > 0 {
            request = request.query(&[("timeout", timeout_secs)]);
        }
        self.execute(request, &format!("channel {}", channel_id)).await
    }

    async fn channel_variable_set(&self, asterisk_id: &str, channel_id: &str, name: &str, value: &str) -> Result<()> {
        let request = self
            .request(Method::POST, asterisk_id, &format!("/channels/{}/variable", channel_id))?
            .query(&[("variable", name), ("value", value)]);
        self.execute(request, &format!("channel {}", channel_id)).await
    }

    async fn bridge_add_channel(&self, asterisk_id: &str, bridge_id: &str, channel_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, asterisk_id, &format!("/bridges/{}/addChannel", bridge_id))?
            .query(&[("channel", channel_id)]);
        self.execute(request, &format!("bridge {}", bridge_id)).await
    }

    async fn bridge_remove_channel(&self, asterisk_id: &str, bridge_id: &str, channel_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, asterisk_id, &format!("/bridges/{}/removeChannel", bridge_id))?
            .query(&[("channel", channel_id)]);
        self.execute(request, &format!("bridge {}", bridge_id)).await
    }

    async fn bridge_delete(&self, asterisk_id: &str, bridge_id: &str) -> Result<()> {
        debug!("🗑️ Deleting bridge {} on {}", bridge_id, asterisk_id);
        let request = self.request(Method::DELETE, asterisk_id, &format!("/bridges/{}", bridge_id))?;
        self.execute(request, &format!("bridge {}", bridge_id)).await
    }

    async fn bridge_record(
        &self,
        asterisk_id: &str,
        bridge_id: &str,
        name: &str,
        format: &str,
        max_duration_secs: u32,
    ) -> Result<()> {
        let request = self
            .request(Method::POST, asterisk_id, &format!("/bridges/{}/record", bridge_id))?
            .query(&[("name", name), ("format", format), ("ifExists", "fail")])
            .query(&[("maxDurationSeconds", max_duration_secs)]);
        self.execute(request, &format!("bridge {}", bridge_id)).await
    }

    async fn recording_stop(&self, asterisk_id: &str, name: &str) -> Result<()> {
        let request = self.request(Method::POST, asterisk_id, &format!("/recordings/live/{}/stop", name))?;
        self.execute(request, &format!("recording {}", name)).await
    }
}
