//! # Peer services
//!
//! The conference engine depends on three sibling services, each behind a trait so the
//! engine can be driven by test doubles:
//!
//! - [`CallManager`]: confbridge allocation, call placement and the call records
//! - [`FlowManager`]: call-routing programs
//! - [`TerminationScheduler`]: delayed conference termination
//!
//! Timeouts are the transport's business; the engine treats a timeout like any other
//! error.

pub mod call_manager;
pub mod flow_manager;
pub mod request;
pub mod scheduler;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use rvoip_ari_core::ConferenceType;

use crate::error::PeerError;
use crate::models::{Action, Call, Confbridge, Flow};

pub use call_manager::CallManagerClient;
pub use flow_manager::FlowManagerClient;
pub use request::HttpRequestHandler;
pub use scheduler::LocalTerminationScheduler;

/// Result type for peer calls
pub type PeerResult<T> = std::result::Result<T, PeerError>;

#[async_trait]
pub trait CallManager: Send + Sync {
    async fn confbridge_create(&self, customer_id: Uuid, confbridge_type: ConferenceType) -> PeerResult<Confbridge>;
    async fn confbridge_get(&self, id: Uuid) -> PeerResult<Confbridge>;
    async fn confbridge_delete(&self, id: Uuid) -> PeerResult<()>;
    /// Move a call into the confbridge
    async fn confbridge_call_add(&self, id: Uuid, call_id: Uuid) -> PeerResult<()>;
    /// Remove a call from the confbridge
    async fn confbridge_call_kick(&self, id: Uuid, call_id: Uuid) -> PeerResult<()>;
    /// The call owning a channel
    async fn call_get_by_channel_id(&self, channel_id: &str) -> PeerResult<Call>;
    /// Point the call at the conference it sits in, nil when it left
    async fn call_update_conference_id(&self, call_id: Uuid, conference_id: Uuid) -> PeerResult<()>;
}

#[async_trait]
pub trait FlowManager: Send + Sync {
    async fn flow_create(
        &self,
        customer_id: Uuid,
        flow_type: &str,
        name: &str,
        detail: &str,
        actions: &[Action],
        persist: bool,
    ) -> PeerResult<Flow>;
    async fn flow_get(&self, id: Uuid) -> PeerResult<Flow>;
    async fn flow_update_actions(&self, id: Uuid, actions: &[Action]) -> PeerResult<Flow>;
    async fn flow_delete(&self, id: Uuid) -> PeerResult<()>;
}

#[async_trait]
pub trait TerminationScheduler: Send + Sync {
    /// Ask for `Terminate(conference_id)` after `delay`
    async fn schedule_termination(&self, conference_id: Uuid, delay: Duration) -> PeerResult<()>;
    /// Drop a pending termination; unknown ids are a no-op
    async fn cancel_termination(&self, conference_id: Uuid) -> PeerResult<()>;
}
