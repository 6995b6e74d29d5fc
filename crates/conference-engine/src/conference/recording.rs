use tracing::{debug, info, warn};
use uuid::Uuid;

use rvoip_ari_core::timestamp;

use crate::error::{ConferenceError, DatabaseError, Result};
use crate::models::{ConferenceStatus, Recording, RecordingReferenceType, RecordingStatus};
use crate::notify::WebhookEventType;

use super::engine::ConferenceEngine;

impl ConferenceEngine {
    /// Start recording the conference mix
    pub async fn recording_start(&self, conference_id: Uuid) -> Result<Recording> {
        let _guard = self.locks.lock(conference_id).await;
        let conference = self.db.conference_get(conference_id).await?;
        if conference.status != ConferenceStatus::Progressing {
            return Err(ConferenceError::invalid_state(format!(
                "conference {} is {}",
                conference_id,
                conference.status.as_str()
            )));
        }
        if conference.is_recording() {
            return Err(ConferenceError::invalid_state(format!(
                "conference {} is already recording {}",
                conference_id, conference.recording_id
            )));
        }

        let confbridge = self.call_manager.confbridge_get(conference.confbridge_id).await?;
        let recording = Recording::for_conference(
            conference.customer_id,
            conference_id,
            &confbridge.asterisk_id,
            &self.config.recording_format,
            &timestamp::now(),
        );
        self.db
            .recording_create(&recording)
            .await
            .map_err(ConferenceError::Persistence)?;

        if let Err(e) = self
            .ari
            .bridge_record(
                &confbridge.asterisk_id,
                &confbridge.bridge_id,
                &recording.recording_name,
                &recording.format,
                self.config.recording_max_duration_secs,
            )
            .await
        {
            warn!("⚠️ Could not start recording on bridge {}: {}", confbridge.bridge_id, e);
            if let Err(e) = self
                .db
                .recording_set_status(recording.id, RecordingStatus::Ended, &timestamp::now())
                .await
            {
                warn!("⚠️ Could not close recording {}: {}", recording.id, e);
            }
            return Err(e.into());
        }

        self.db.conference_set_recording_id(conference_id, recording.id).await?;
        self.db.conference_add_recording_id(conference_id, recording.id).await?;

        info!("🎙️ Recording {} started for conference {}", recording.id, conference_id);
        Ok(recording)
    }

    /// Stop the conference's active recording
    pub async fn recording_stop(&self, conference_id: Uuid) -> Result<Recording> {
        let _guard = self.locks.lock(conference_id).await;
        let conference = self.db.conference_get(conference_id).await?;
        if !conference.is_recording() {
            return Err(ConferenceError::invalid_state(format!(
                "conference {} is not recording",
                conference_id
            )));
        }

        let recording = self.db.recording_get(conference.recording_id).await?;
        match self
            .ari
            .recording_stop(&recording.asterisk_id, &recording.recording_name)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("Recording {} is already gone from the engine", recording.recording_name);
            }
            Err(e) => return Err(e.into()),
        }

        self.db
            .recording_set_status(recording.id, RecordingStatus::Stopping, &timestamp::now())
            .await?;
        self.db.conference_set_recording_id(conference_id, Uuid::nil()).await?;

        info!("⏹️ Recording {} stopped for conference {}", recording.id, conference_id);
        Ok(self.db.recording_get(recording.id).await?)
    }

    /// The engine began writing a recording
    pub async fn on_recording_started(&self, recording_name: &str, timestamp: &str) -> Result<()> {
        let Some(recording) = self.find_recording(recording_name).await? else {
            return Ok(());
        };

        self.db
            .recording_set_status(recording.id, RecordingStatus::Recording, timestamp)
            .await?;
        let recording = self.db.recording_get(recording.id).await?;
        self.notify_payload(recording.customer_id, WebhookEventType::RecordingStarted, &recording)
            .await;
        Ok(())
    }

    /// The engine finished writing a recording
    pub async fn on_recording_finished(&self, recording_name: &str, timestamp: &str) -> Result<()> {
        let Some(recording) = self.find_recording(recording_name).await? else {
            return Ok(());
        };

        self.db
            .recording_set_status(recording.id, RecordingStatus::Ended, timestamp)
            .await?;

        if recording.reference_type == RecordingReferenceType::Conference {
            let conference_id = recording.reference_id;
            let _guard = self.locks.lock(conference_id).await;
            match self.db.conference_get(conference_id).await {
                Ok(conference) if conference.recording_id == recording.id => {
                    self.db.conference_set_recording_id(conference_id, Uuid::nil()).await?;
                }
                Ok(_) => {}
                Err(e) => warn!("⚠️ Conference {} of recording {}: {}", conference_id, recording.id, e),
            }
        }

        let recording = self.db.recording_get(recording.id).await?;
        self.notify_payload(recording.customer_id, WebhookEventType::RecordingFinished, &recording)
            .await;
        Ok(())
    }

    async fn find_recording(&self, recording_name: &str) -> Result<Option<Recording>> {
        match self.db.recording_get_by_name(recording_name).await {
            Ok(recording) => Ok(Some(recording)),
            Err(DatabaseError::NotFound(_)) => {
                debug!("Recording {} is not ours, ignoring", recording_name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
