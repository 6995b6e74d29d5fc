//! # Conference state machine
//!
//! [`ConferenceEngine`] owns conference creation, membership bookkeeping, update,
//! recording and termination. Membership changes are driven by bridge events: the
//! dispatcher forwards `ChannelEnteredBridge`/`ChannelLeftBridge` to
//! [`ConferenceEngine::on_channel_entered_bridge`] and
//! [`ConferenceEngine::on_channel_left_bridge`], which classify the bridge by its
//! [`BridgeRole`] and record `joined`/`leaved`.

pub mod classify;
pub mod engine;
pub mod locks;

mod create;
mod join;
mod recording;
mod terminate;
mod update;

pub use classify::{classify, BridgeRole};
pub use engine::{ConferenceEngine, EngineDependencies};
pub use locks::{ConferenceGuard, ConferenceLocks};
