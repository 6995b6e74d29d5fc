use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use rvoip_ari_core::timestamp;

use crate::models::{Conference, ConferenceStatus, UpdateConference};

use super::memory::MemoryDatabase;
use super::{ConferenceStore, DbResult};

const WHAT: &str = "conference";

#[async_trait]
impl ConferenceStore for MemoryDatabase {
    async fn conference_create(&self, conference: &Conference) -> DbResult<()> {
        debug!("Creating conference {}", conference.id);
        Self::insert_new(&self.conferences, conference.id, conference.clone(), WHAT)
    }

    async fn conference_get(&self, id: Uuid) -> DbResult<Conference> {
        Self::fetch(&self.conferences, &id, WHAT)
    }

    async fn conference_list(&self, customer_id: Uuid, size: usize, token: &str) -> DbResult<Vec<Conference>> {
        let mut res: Vec<Conference> = self
            .conferences
            .iter()
            .filter(|entry| entry.customer_id == customer_id && entry.tm_create.as_str() < token)
            .map(|entry| entry.value().clone())
            .collect();
        res.sort_by(|a, b| b.tm_create.cmp(&a.tm_create));
        res.truncate(size);
        Ok(res)
    }

    async fn conference_set_status(&self, id: Uuid, status: ConferenceStatus) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            conference.status = status;
            conference.tm_update = timestamp::now();
        })
    }

    async fn conference_set(&self, id: Uuid, update: &UpdateConference) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            conference.name = update.name.clone();
            conference.detail = update.detail.clone();
            conference.timeout = update.timeout;
            conference.pre_actions = update.pre_actions.clone();
            conference.post_actions = update.post_actions.clone();
            conference.tm_update = timestamp::now();
        })
    }

    async fn conference_add_call_id(&self, id: Uuid, call_id: Uuid) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            if !conference.call_ids.contains(&call_id) {
                conference.call_ids.push(call_id);
            }
            conference.tm_update = timestamp::now();
        })
    }

    async fn conference_remove_call_id(&self, id: Uuid, call_id: Uuid) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            conference.call_ids.retain(|c| *c != call_id);
            conference.tm_update = timestamp::now();
        })
    }

    async fn conference_set_recording_id(&self, id: Uuid, recording_id: Uuid) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            conference.recording_id = recording_id;
            conference.tm_update = timestamp::now();
        })
    }

    async fn conference_add_recording_id(&self, id: Uuid, recording_id: Uuid) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            if !conference.recording_ids.contains(&recording_id) {
                conference.recording_ids.push(recording_id);
            }
            conference.tm_update = timestamp::now();
        })
    }

    async fn conference_end(&self, id: Uuid, timestamp: &str) -> DbResult<()> {
        Self::modify(&self.conferences, &id, WHAT, |conference| {
            conference.status = ConferenceStatus::Terminated;
            conference.tm_delete = timestamp.to_string();
            conference.tm_update = timestamp.to_string();
        })
    }
}
