use rvoip_ari_core::event::types::{RecordingFinished, RecordingStarted};

use crate::error::Result;

use super::EventDispatcher;

impl EventDispatcher {
    pub(super) async fn recording_started(&self, event: RecordingStarted) -> Result<()> {
        self.engine
            .on_recording_started(&event.recording.name, &event.header.timestamp)
            .await
    }

    pub(super) async fn recording_finished(&self, event: RecordingFinished) -> Result<()> {
        self.engine
            .on_recording_finished(&event.recording.name, &event.header.timestamp)
            .await
    }
}
