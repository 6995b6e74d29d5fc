//! Shared doubles and harness for the conference engine integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use rvoip_ari_core::event::AriChannel;
use rvoip_ari_core::model::bridge_name;
use rvoip_ari_core::{AriCommands, AriError, Bridge, Channel, ConferenceType, HangupReason};
use rvoip_ari_core::event::AriBridge;

use rvoip_conference_engine::config::ConferenceConfig;
use rvoip_conference_engine::database::{BridgeStore, ChannelStore, MemoryDatabase};
use rvoip_conference_engine::dispatcher::EventDispatcher;
use rvoip_conference_engine::error::PeerError;
use rvoip_conference_engine::models::{Action, Call, Confbridge, Conference, CreateConference, Flow};
use rvoip_conference_engine::monitoring::CounterMetrics;
use rvoip_conference_engine::notify::{NotifyHandler, WebhookEventType};
use rvoip_conference_engine::peers::{CallManager, FlowManager, PeerResult, TerminationScheduler};
use rvoip_conference_engine::{ConferenceEngine, EngineDependencies};

pub const ASTERISK_ID: &str = "42:01:0a:a4:00:05";
pub const TIMESTAMP: &str = "2024-05-01 10:00:00.000000";

// Engine commands

#[derive(Debug, Clone, PartialEq)]
pub enum AriCommand {
    Hangup { channel_id: String, reason: HangupReason },
    Answer { channel_id: String },
    Dial { channel_id: String },
    VariableSet { channel_id: String, name: String, value: String },
    BridgeAddChannel { bridge_id: String, channel_id: String },
    BridgeRemoveChannel { bridge_id: String, channel_id: String },
    BridgeDelete { bridge_id: String },
    BridgeRecord { bridge_id: String, name: String, format: String },
    RecordingStop { name: String },
}

#[derive(Default)]
pub struct MockAri {
    pub commands: Mutex<Vec<AriCommand>>,
    pub fail_record: AtomicBool,
    pub recording_gone: AtomicBool,
}

impl MockAri {
    pub fn commands(&self) -> Vec<AriCommand> {
        self.commands.lock().clone()
    }

    pub fn hangups(&self) -> Vec<(String, HangupReason)> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                AriCommand::Hangup { channel_id, reason } => Some((channel_id, reason)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, command: AriCommand) {
        self.commands.lock().push(command);
    }
}

#[async_trait]
impl AriCommands for MockAri {
    async fn channel_hangup(&self, _asterisk_id: &str, channel_id: &str, reason: HangupReason) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::Hangup {
            channel_id: channel_id.to_string(),
            reason,
        });
        Ok(())
    }

    async fn channel_answer(&self, _asterisk_id: &str, channel_id: &str) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::Answer {
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn channel_dial(&self, _asterisk_id: &str, channel_id: &str, _caller: &str, _timeout_secs: u32) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::Dial {
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn channel_variable_set(&self, _asterisk_id: &str, channel_id: &str, name: &str, value: &str) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::VariableSet {
            channel_id: channel_id.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn bridge_add_channel(&self, _asterisk_id: &str, bridge_id: &str, channel_id: &str) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::BridgeAddChannel {
            bridge_id: bridge_id.to_string(),
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn bridge_remove_channel(&self, _asterisk_id: &str, bridge_id: &str, channel_id: &str) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::BridgeRemoveChannel {
            bridge_id: bridge_id.to_string(),
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn bridge_delete(&self, _asterisk_id: &str, bridge_id: &str) -> rvoip_ari_core::Result<()> {
        self.push(AriCommand::BridgeDelete {
            bridge_id: bridge_id.to_string(),
        });
        Ok(())
    }

    async fn bridge_record(
        &self,
        _asterisk_id: &str,
        bridge_id: &str,
        name: &str,
        format: &str,
        _max_duration_secs: u32,
    ) -> rvoip_ari_core::Result<()> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(AriError::Status {
                status: 500,
                body: "record failed".to_string(),
            });
        }
        self.push(AriCommand::BridgeRecord {
            bridge_id: bridge_id.to_string(),
            name: name.to_string(),
            format: format.to_string(),
        });
        Ok(())
    }

    async fn recording_stop(&self, _asterisk_id: &str, name: &str) -> rvoip_ari_core::Result<()> {
        if self.recording_gone.load(Ordering::SeqCst) {
            return Err(AriError::not_found(name));
        }
        self.push(AriCommand::RecordingStop {
            name: name.to_string(),
        });
        Ok(())
    }
}

// Peers

#[derive(Default)]
pub struct MockCallManager {
    pub confbridges: Mutex<HashMap<Uuid, Confbridge>>,
    pub created: AtomicUsize,
    pub deleted: Mutex<Vec<Uuid>>,
    pub call_adds: Mutex<Vec<(Uuid, Uuid)>>,
    pub call_kicks: Mutex<Vec<(Uuid, Uuid)>>,
    pub calls: Mutex<HashMap<Uuid, Call>>,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_call_add: AtomicBool,
}

impl MockCallManager {
    pub fn delete_count(&self, id: Uuid) -> usize {
        self.deleted.lock().iter().filter(|d| **d == id).count()
    }

    pub fn insert_call(&self, call: Call) {
        self.calls.lock().insert(call.id, call);
    }

    pub fn call(&self, id: Uuid) -> Option<Call> {
        self.calls.lock().get(&id).cloned()
    }

    pub fn call_for_channel(&self, channel_id: &str) -> Option<Call> {
        self.calls
            .lock()
            .values()
            .find(|call| call.channel_id == channel_id)
            .cloned()
    }
}

#[async_trait]
impl CallManager for MockCallManager {
    async fn confbridge_create(&self, customer_id: Uuid, confbridge_type: ConferenceType) -> PeerResult<Confbridge> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(PeerError::status(500, "confbridge create failed"));
        }
        let id = Uuid::new_v4();
        let confbridge = Confbridge {
            id,
            customer_id,
            confbridge_type,
            asterisk_id: ASTERISK_ID.to_string(),
            bridge_id: format!("bridge-{}", id),
        };
        self.created.fetch_add(1, Ordering::SeqCst);
        self.confbridges.lock().insert(id, confbridge.clone());
        Ok(confbridge)
    }

    async fn confbridge_get(&self, id: Uuid) -> PeerResult<Confbridge> {
        self.confbridges
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| PeerError::not_found(format!("confbridge {}", id)))
    }

    async fn confbridge_delete(&self, id: Uuid) -> PeerResult<()> {
        self.deleted.lock().push(id);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PeerError::status(500, "confbridge delete failed"));
        }
        self.confbridges.lock().remove(&id);
        Ok(())
    }

    async fn confbridge_call_add(&self, id: Uuid, call_id: Uuid) -> PeerResult<()> {
        if self.fail_call_add.load(Ordering::SeqCst) {
            return Err(PeerError::status(503, "call manager unavailable"));
        }
        self.call_adds.lock().push((id, call_id));
        Ok(())
    }

    async fn confbridge_call_kick(&self, id: Uuid, call_id: Uuid) -> PeerResult<()> {
        self.call_kicks.lock().push((id, call_id));
        Ok(())
    }

    /// Every call leg belongs to some call; unknown channels get a fresh one
    async fn call_get_by_channel_id(&self, channel_id: &str) -> PeerResult<Call> {
        if let Some(call) = self.call_for_channel(channel_id) {
            return Ok(call);
        }
        let call = Call::new(Uuid::nil(), channel_id);
        self.insert_call(call.clone());
        Ok(call)
    }

    async fn call_update_conference_id(&self, call_id: Uuid, conference_id: Uuid) -> PeerResult<()> {
        let mut calls = self.calls.lock();
        let call = calls
            .get_mut(&call_id)
            .ok_or_else(|| PeerError::not_found(format!("call {}", call_id)))?;
        call.conference_id = conference_id;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockFlowManager {
    pub flows: Mutex<HashMap<Uuid, Flow>>,
    pub created: AtomicUsize,
    pub deleted: Mutex<Vec<Uuid>>,
    pub updates: Mutex<Vec<(Uuid, Vec<Action>)>>,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_update: AtomicBool,
}

impl MockFlowManager {
    pub fn delete_count(&self, id: Uuid) -> usize {
        self.deleted.lock().iter().filter(|d| **d == id).count()
    }
}

#[async_trait]
impl FlowManager for MockFlowManager {
    async fn flow_create(
        &self,
        customer_id: Uuid,
        flow_type: &str,
        name: &str,
        detail: &str,
        actions: &[Action],
        persist: bool,
    ) -> PeerResult<Flow> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(PeerError::status(500, "flow create failed"));
        }
        let flow = Flow {
            id: Uuid::new_v4(),
            customer_id,
            flow_type: flow_type.to_string(),
            name: name.to_string(),
            detail: detail.to_string(),
            actions: actions.to_vec(),
            persist,
        };
        self.created.fetch_add(1, Ordering::SeqCst);
        self.flows.lock().insert(flow.id, flow.clone());
        Ok(flow)
    }

    async fn flow_get(&self, id: Uuid) -> PeerResult<Flow> {
        self.flows
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| PeerError::not_found(format!("flow {}", id)))
    }

    async fn flow_update_actions(&self, id: Uuid, actions: &[Action]) -> PeerResult<Flow> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(PeerError::status(500, "flow update failed"));
        }
        self.updates.lock().push((id, actions.to_vec()));
        let mut flows = self.flows.lock();
        let flow = flows
            .get_mut(&id)
            .ok_or_else(|| PeerError::not_found(format!("flow {}", id)))?;
        flow.actions = actions.to_vec();
        Ok(flow.clone())
    }

    async fn flow_delete(&self, id: Uuid) -> PeerResult<()> {
        self.deleted.lock().push(id);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PeerError::status(500, "flow delete failed"));
        }
        self.flows.lock().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockScheduler {
    pub scheduled: Mutex<Vec<(Uuid, Duration)>>,
    pub cancelled: Mutex<Vec<Uuid>>,
    pub fail: AtomicBool,
}

impl MockScheduler {
    pub fn scheduled(&self) -> Vec<(Uuid, Duration)> {
        self.scheduled.lock().clone()
    }

    pub fn cancelled(&self) -> Vec<Uuid> {
        self.cancelled.lock().clone()
    }
}

#[async_trait]
impl TerminationScheduler for MockScheduler {
    async fn schedule_termination(&self, conference_id: Uuid, delay: Duration) -> PeerResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PeerError::status(503, "scheduler unavailable"));
        }
        self.scheduled.lock().push((conference_id, delay));
        Ok(())
    }

    async fn cancel_termination(&self, conference_id: Uuid) -> PeerResult<()> {
        self.cancelled.lock().push(conference_id);
        Ok(())
    }
}

// Notifier

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(Uuid, WebhookEventType, Value)>>,
}

impl RecordingNotifier {
    pub fn of_type(&self, event_type: WebhookEventType) -> Vec<Value> {
        self.events
            .lock()
            .iter()
            .filter(|(_, t, _)| *t == event_type)
            .map(|(_, _, data)| data.clone())
            .collect()
    }
}

#[async_trait]
impl NotifyHandler for RecordingNotifier {
    async fn publish_webhook_event(&self, customer_id: Uuid, event_type: WebhookEventType, data: Value) {
        self.events.lock().push((customer_id, event_type, data));
    }
}

// Harness

pub struct Harness {
    pub customer_id: Uuid,
    pub engine: Arc<ConferenceEngine>,
    pub dispatcher: EventDispatcher,
    pub db: Arc<MemoryDatabase>,
    pub ari: Arc<MockAri>,
    pub call_manager: Arc<MockCallManager>,
    pub flow_manager: Arc<MockFlowManager>,
    pub scheduler: Arc<MockScheduler>,
    pub notifier: Arc<RecordingNotifier>,
    pub metrics: Arc<CounterMetrics>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ConferenceConfig {
            existence_check_timeout_ms: 60,
            ..Default::default()
        })
    }

    pub fn with_config(config: ConferenceConfig) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let ari = Arc::new(MockAri::default());
        let call_manager = Arc::new(MockCallManager::default());
        let flow_manager = Arc::new(MockFlowManager::default());
        let scheduler = Arc::new(MockScheduler::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let metrics = Arc::new(CounterMetrics::new());

        let existence_timeout = config.existence_check_timeout();
        let engine = ConferenceEngine::new(
            config,
            EngineDependencies {
                db: db.clone(),
                ari: ari.clone(),
                call_manager: call_manager.clone(),
                flow_manager: flow_manager.clone(),
                scheduler: scheduler.clone(),
                notify: notifier.clone(),
                metrics: metrics.clone(),
            },
        );
        let dispatcher = EventDispatcher::new(
            db.clone(),
            engine.clone(),
            ari.clone(),
            metrics.clone(),
            existence_timeout,
        );

        Self {
            customer_id: Uuid::new_v4(),
            engine,
            dispatcher,
            db,
            ari,
            call_manager,
            flow_manager,
            scheduler,
            notifier,
            metrics,
        }
    }

    pub async fn create_conference(&self, conference_type: ConferenceType, timeout: u32) -> Conference {
        self.engine
            .create(CreateConference {
                conference_type,
                customer_id: self.customer_id,
                name: "weekly sync".to_string(),
                detail: "team call".to_string(),
                timeout,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    /// A call-type channel and the call that owns it
    pub async fn add_call(&self, channel_id: &str) -> Call {
        let channel = call_channel(channel_id);
        self.db.channel_create(&channel).await.unwrap();
        let call = Call::new(self.customer_id, channel_id);
        self.call_manager.insert_call(call.clone());
        call
    }

    /// The conference's mixing bridge
    pub async fn add_conference_bridge(&self, conference: &Conference, bridge_id: &str) -> Bridge {
        let name = bridge_name::encode(conference.id, conference.conference_type, false);
        let bridge = bridge(bridge_id, &name);
        self.db.bridge_create(&bridge).await.unwrap();
        bridge
    }

    /// Enter a channel into a bridge the way the dispatcher does
    pub async fn enter(&self, channel_id: &str, bridge_id: &str) -> rvoip_conference_engine::Result<()> {
        self.db.channel_set_bridge_id(channel_id, bridge_id).await.unwrap();
        self.db.bridge_add_channel_id(bridge_id, channel_id).await.unwrap();
        let channel = self.db.channel_get(channel_id).await.unwrap();
        let bridge = self.db.bridge_get(bridge_id).await.unwrap();
        self.engine.on_channel_entered_bridge(&channel, &bridge).await
    }

    /// Remove a channel from a bridge the way the dispatcher does
    pub async fn leave(&self, channel_id: &str, bridge_id: &str) -> rvoip_conference_engine::Result<()> {
        self.db.channel_set_bridge_id(channel_id, "").await.unwrap();
        self.db.bridge_remove_channel_id(bridge_id, channel_id).await.unwrap();
        let channel = self.db.channel_get(channel_id).await.unwrap();
        let bridge = self.db.bridge_get(bridge_id).await.unwrap();
        self.engine.on_channel_left_bridge(&channel, &bridge).await
    }
}

pub fn call_channel(channel_id: &str) -> Channel {
    let ari = AriChannel {
        id: channel_id.to_string(),
        name: format!("PJSIP/call-in-{}", channel_id),
        channelvars: HashMap::from([("VB-TYPE".to_string(), json!("call"))]),
        ..Default::default()
    };
    Channel::from_ari(ASTERISK_ID, &ari, TIMESTAMP)
}

pub fn bridge(bridge_id: &str, name: &str) -> Bridge {
    let ari = AriBridge {
        id: bridge_id.to_string(),
        name: name.to_string(),
        technology: "softmix".to_string(),
        bridge_type: "mixing".to_string(),
        ..Default::default()
    };
    Bridge::from_ari(ASTERISK_ID, &ari, TIMESTAMP)
}
