//! # rvoip-conference-engine
//!
//! Conference service of the rvoip platform. It ingests Asterisk ARI events, keeps
//! channel and bridge records current, and runs the conference state machine on top
//! of them.
//!
//! ```text
//! ┌──────────────┐  frames   ┌────────────────┐  Channel/Bridge  ┌──────────────────┐
//! │ AriConnector │──────────▶│ EventDispatcher│─────────────────▶│ ConferenceEngine │
//! └──────┬───────┘           └───────┬────────┘                  └────────┬─────────┘
//!        │ raw frames                │ repository writes                  │ peer RPC
//!        ▼                           ▼                                    ▼
//!    EventBus                   Repository                CallManager / FlowManager
//! ```
//!
//! - [`conference`]: the state machine, bridge role classification and per-conference
//!   locking
//! - [`dispatcher`]: one handler per ARI event type
//! - [`database`]: repository traits and the in-memory implementation
//! - [`peers`]: call-manager, flow-manager and termination scheduler clients
//! - [`api`]: the HTTP RPC surface
//! - [`server`]: wiring and background tasks

pub mod api;
pub mod bus;
pub mod conference;
pub mod config;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitoring;
pub mod notify;
pub mod peers;
pub mod server;

pub use conference::{BridgeRole, ConferenceEngine, EngineDependencies};
pub use config::ServiceConfig;
pub use dispatcher::EventDispatcher;
pub use error::{ConferenceError, ErrorKind, Result};
pub use server::{ConferenceServer, ConferenceServerBuilder};

/// Convenience re-exports
pub mod prelude {
    pub use crate::conference::{ConferenceEngine, EngineDependencies};
    pub use crate::database::{MemoryDatabase, Repository};
    pub use crate::error::{ConferenceError, Result};
    pub use crate::models::*;
    pub use crate::monitoring::{CounterMetrics, MetricsSink};
    pub use crate::notify::{NotifyHandler, WebhookEventType};
    pub use crate::peers::{CallManager, FlowManager, TerminationScheduler};
}
