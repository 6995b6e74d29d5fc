use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::models::{Recording, RecordingStatus};

use super::memory::MemoryDatabase;
use super::{DbResult, RecordingStore};

const WHAT: &str = "recording";

#[async_trait]
impl RecordingStore for MemoryDatabase {
    async fn recording_create(&self, recording: &Recording) -> DbResult<()> {
        Self::insert_new(&self.recordings, recording.id, recording.clone(), WHAT)
    }

    async fn recording_get(&self, id: Uuid) -> DbResult<Recording> {
        Self::fetch(&self.recordings, &id, WHAT)
    }

    async fn recording_get_by_name(&self, recording_name: &str) -> DbResult<Recording> {
        self.recordings
            .iter()
            .find(|entry| entry.recording_name == recording_name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DatabaseError::not_found(format!("recording {}", recording_name)))
    }

    async fn recording_set_status(&self, id: Uuid, status: RecordingStatus, timestamp: &str) -> DbResult<()> {
        Self::modify(&self.recordings, &id, WHAT, |recording| {
            match status {
                RecordingStatus::Recording => recording.tm_start = timestamp.to_string(),
                RecordingStatus::Ended => recording.tm_end = timestamp.to_string(),
                RecordingStatus::Initiating | RecordingStatus::Stopping => {}
            }
            recording.status = status;
            recording.tm_update = timestamp.to_string();
        })
    }
}
