//! Platform entities the conference engine reads and writes

pub mod call;
pub mod confbridge;
pub mod conference;
pub mod flow;
pub mod recording;

pub use call::Call;
pub use confbridge::Confbridge;
pub use conference::{Conference, ConferenceStatus, ConferenceWebhook, CreateConference, UpdateConference};
pub use flow::{Action, Flow};
pub use recording::{Recording, RecordingReferenceType, RecordingStatus};
