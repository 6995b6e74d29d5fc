//! ARI events flowing through the dispatcher into the repository and the engine

mod common;

use serde_json::{json, Value};

use rvoip_ari_core::model::bridge_name;
use rvoip_ari_core::{ChannelState, ChannelType, ConferenceType, Event, HangupReason};
use rvoip_conference_engine::database::{BridgeStore, ChannelStore, RecordingStore};
use rvoip_conference_engine::error::ConferenceError;
use rvoip_conference_engine::models::{ConferenceStatus, RecordingStatus};
use rvoip_conference_engine::monitoring::ARI_EVENT_TOTAL;

use common::{Harness, ASTERISK_ID};

const WIRE_TS: &str = "2024-05-01T10:00:00.123+0000";
const CANONICAL_TS: &str = "2024-05-01 10:00:00.123000";

fn frame(event_type: &str, body: Value) -> Event {
    let mut value = json!({
        "type": event_type,
        "application": "voipbin",
        "asterisk_id": ASTERISK_ID,
        "timestamp": WIRE_TS,
    });
    if let (Some(target), Some(extra)) = (value.as_object_mut(), body.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    rvoip_ari_core::decode(value.to_string().as_bytes()).unwrap()
}

fn channel_json(id: &str, vb_type: &str) -> Value {
    json!({
        "id": id,
        "name": format!("PJSIP/call-in-{}", id),
        "state": "Ring",
        "caller": { "name": "Alice", "number": "+15551230001" },
        "connected": { "name": "", "number": "" },
        "dialplan": { "context": "call-in", "exten": "+15551230002", "priority": 1 },
        "creationtime": "2024-05-01T10:00:00.000+0000",
        "language": "en",
        "channelvars": { "VB-TYPE": vb_type }
    })
}

fn bridge_json(id: &str, name: &str, channels: &[&str]) -> Value {
    json!({
        "id": id,
        "technology": "softmix",
        "bridge_type": "mixing",
        "bridge_class": "stasis",
        "creator": "Stasis",
        "name": name,
        "channels": channels,
        "video_mode": "talker",
        "creationtime": "2024-05-01T10:00:00.000+0000"
    })
}

async fn create_channel(h: &Harness, id: &str) {
    h.dispatcher
        .dispatch(frame("ChannelCreated", json!({ "channel": channel_json(id, "call") })))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_channel_created() {
    let h = Harness::new();
    create_channel(&h, "1714557600.101").await;

    let channel = h.db.channel_get("1714557600.101").await.unwrap();
    assert_eq!(channel.asterisk_id, ASTERISK_ID);
    assert_eq!(channel.channel_type, ChannelType::Call);
    assert_eq!(channel.source_number, "+15551230001");
    assert_eq!(channel.destination_number, "+15551230002");
    assert_eq!(channel.state, ChannelState::Ring);
    assert_eq!(channel.tm_create, CANONICAL_TS);
    assert_eq!(h.metrics.get(ARI_EVENT_TOTAL, "ChannelCreated"), 1);
}

#[tokio::test]
async fn test_state_change_on_unknown_channel_hangs_up() {
    let h = Harness::new();
    let event = frame("ChannelStateChange", json!({ "channel": channel_json("ghost", "call") }));

    let err = h.dispatcher.dispatch(event).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.ari.hangups(), vec![("ghost".to_string(), HangupReason::Normal)]);
}

#[tokio::test]
async fn test_state_change_stamps_answer() {
    let h = Harness::new();
    create_channel(&h, "chan-1").await;

    let mut up = channel_json("chan-1", "call");
    up["state"] = json!("Up");
    h.dispatcher
        .dispatch(frame("ChannelStateChange", json!({ "channel": up })))
        .await
        .unwrap();

    let channel = h.db.channel_get("chan-1").await.unwrap();
    assert_eq!(channel.state, ChannelState::Up);
    assert_eq!(channel.tm_answer, CANONICAL_TS);
}

#[tokio::test]
async fn test_channel_destroyed() {
    let h = Harness::new();

    // an unknown channel is already gone, nothing to hang up
    let event = frame(
        "ChannelDestroyed",
        json!({ "cause": 16, "cause_txt": "Normal Clearing", "channel": channel_json("ghost", "call") }),
    );
    assert!(h.dispatcher.dispatch(event).await.is_err());
    assert!(h.ari.hangups().is_empty());

    create_channel(&h, "chan-1").await;
    let event = frame(
        "ChannelDestroyed",
        json!({ "cause": 16, "cause_txt": "Normal Clearing", "channel": channel_json("chan-1", "call") }),
    );
    h.dispatcher.dispatch(event).await.unwrap();

    let channel = h.db.channel_get("chan-1").await.unwrap();
    assert_eq!(channel.hangup_cause, 16);
    assert_eq!(channel.tm_end, CANONICAL_TS);
    assert!(channel.is_ended());
}

#[tokio::test]
async fn test_varset_updates_data() {
    let h = Harness::new();
    create_channel(&h, "chan-1").await;

    let event = frame(
        "ChannelVarset",
        json!({ "variable": "SIP_CALLID", "value": "a84b4c76e66710@pc33", "channel": channel_json("chan-1", "call") }),
    );
    h.dispatcher.dispatch(event).await.unwrap();

    let channel = h.db.channel_get("chan-1").await.unwrap();
    assert_eq!(channel.sip_call_id, "a84b4c76e66710@pc33");
    assert_eq!(channel.data_str("SIP_CALLID"), Some("a84b4c76e66710@pc33"));

    // global variables carry no channel
    let event = frame("ChannelVarset", json!({ "variable": "GLOBAL_X", "value": "1" }));
    h.dispatcher.dispatch(event).await.unwrap();
}

#[tokio::test]
async fn test_stasis_start_creates_missing_channel() {
    let h = Harness::new();
    let event = frame(
        "StasisStart",
        json!({
            "args": ["context=call-in", "call_id=8a4b", "malformed"],
            "channel": channel_json("chan-9", "call")
        }),
    );
    h.dispatcher.dispatch(event).await.unwrap();

    let channel = h.db.channel_get("chan-9").await.unwrap();
    assert_eq!(channel.stasis_name, "voipbin");
    assert_eq!(channel.stasis_data.get("context").map(String::as_str), Some("call-in"));
    assert_eq!(channel.stasis_data.get("call_id").map(String::as_str), Some("8a4b"));
    assert_eq!(channel.stasis_data.len(), 2);
}

#[tokio::test]
async fn test_bridge_created_and_destroyed() {
    let h = Harness::new();
    let conference_id = uuid::Uuid::new_v4();
    let name = bridge_name::encode(conference_id, ConferenceType::Conference, false);

    h.dispatcher
        .dispatch(frame("BridgeCreated", json!({ "bridge": bridge_json("br-1", &name, &[]) })))
        .await
        .unwrap();
    let bridge = h.db.bridge_get("br-1").await.unwrap();
    assert_eq!(bridge.conference_id, conference_id);
    assert_eq!(bridge.conference_type, ConferenceType::Conference);
    assert!(!bridge.conference_join);

    h.dispatcher
        .dispatch(frame("BridgeDestroyed", json!({ "bridge": bridge_json("br-1", &name, &[]) })))
        .await
        .unwrap();
    assert!(h.db.bridge_get("br-1").await.unwrap().is_deleted());

    let err = h
        .dispatcher
        .dispatch(frame("BridgeDestroyed", json!({ "bridge": bridge_json("br-unknown", "", &[]) })))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

async fn enter_bridge(h: &Harness, channel_id: &str, bridge_id: &str, name: &str) {
    h.dispatcher
        .dispatch(frame(
            "ChannelEnteredBridge",
            json!({ "bridge": bridge_json(bridge_id, name, &[channel_id]), "channel": channel_json(channel_id, "call") }),
        ))
        .await
        .unwrap();
}

async fn leave_bridge(h: &Harness, channel_id: &str, bridge_id: &str, name: &str) {
    h.dispatcher
        .dispatch(frame(
            "ChannelLeftBridge",
            json!({ "bridge": bridge_json(bridge_id, name, &[]), "channel": channel_json(channel_id, "call") }),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bridge_membership_reaches_conference() {
    let h = Harness::new();
    let conference = h.create_conference(ConferenceType::Conference, 0).await;
    let name = bridge_name::encode(conference.id, ConferenceType::Conference, false);

    // the call record lives with the call manager; nothing is seeded locally
    create_channel(&h, "chan-1").await;
    h.dispatcher
        .dispatch(frame("BridgeCreated", json!({ "bridge": bridge_json("br-1", &name, &[]) })))
        .await
        .unwrap();

    enter_bridge(&h, "chan-1", "br-1", &name).await;

    let call = h.call_manager.call_for_channel("chan-1").unwrap();
    assert_eq!(call.conference_id, conference.id);
    assert_eq!(h.db.channel_get("chan-1").await.unwrap().bridge_id, "br-1");
    assert_eq!(h.db.bridge_get("br-1").await.unwrap().channel_ids, vec!["chan-1".to_string()]);
    assert_eq!(h.engine.get(conference.id).await.unwrap().call_ids, vec![call.id]);

    leave_bridge(&h, "chan-1", "br-1", &name).await;

    assert_eq!(h.db.channel_get("chan-1").await.unwrap().bridge_id, "");
    assert!(h.db.bridge_get("br-1").await.unwrap().channel_ids.is_empty());
    assert!(h.call_manager.call(call.id).unwrap().conference_id.is_nil());
    let current = h.engine.get(conference.id).await.unwrap();
    assert!(current.call_ids.is_empty());
    assert_eq!(current.status, ConferenceStatus::Progressing);
}

#[tokio::test]
async fn test_echo_ends_when_caller_leaves_bridge() {
    let h = Harness::new();
    let conference = h.create_conference(ConferenceType::Echo, 0).await;
    let name = bridge_name::encode(conference.id, ConferenceType::Echo, false);

    create_channel(&h, "chan-1").await;
    h.dispatcher
        .dispatch(frame("BridgeCreated", json!({ "bridge": bridge_json("br-echo", &name, &[]) })))
        .await
        .unwrap();

    enter_bridge(&h, "chan-1", "br-echo", &name).await;
    assert_eq!(h.engine.get(conference.id).await.unwrap().call_ids.len(), 1);

    leave_bridge(&h, "chan-1", "br-echo", &name).await;
    let ended = h.engine.get(conference.id).await.unwrap();
    assert_eq!(ended.status, ConferenceStatus::Terminated);
    assert_eq!(h.call_manager.delete_count(conference.confbridge_id), 1);
}

#[tokio::test]
async fn test_entering_unknown_bridge_hangs_up() {
    let h = Harness::new();
    create_channel(&h, "chan-1").await;

    let err = h
        .dispatcher
        .dispatch(frame(
            "ChannelEnteredBridge",
            json!({ "bridge": bridge_json("br-missing", "", &["chan-1"]), "channel": channel_json("chan-1", "call") }),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ConferenceError::NotFound(_)));
    assert_eq!(h.ari.hangups(), vec![("chan-1".to_string(), HangupReason::Normal)]);
}

#[tokio::test]
async fn test_foreign_bridge_hangs_up_with_interworking() {
    let h = Harness::new();
    create_channel(&h, "chan-1").await;
    h.dispatcher
        .dispatch(frame("BridgeCreated", json!({ "bridge": bridge_json("br-1", "parking-lot", &[]) })))
        .await
        .unwrap();

    let err = h
        .dispatcher
        .dispatch(frame(
            "ChannelEnteredBridge",
            json!({ "bridge": bridge_json("br-1", "parking-lot", &["chan-1"]), "channel": channel_json("chan-1", "call") }),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ConferenceError::Classification(_)));
    assert_eq!(h.ari.hangups(), vec![("chan-1".to_string(), HangupReason::Interworking)]);
}

#[tokio::test]
async fn test_playback_tracked_on_channel() {
    let h = Harness::new();
    create_channel(&h, "chan-1").await;

    let playback = json!({ "id": "pb-1", "media_uri": "sound:hello", "target_uri": "channel:chan-1", "state": "playing" });
    h.dispatcher
        .dispatch(frame("PlaybackStarted", json!({ "playback": playback })))
        .await
        .unwrap();
    assert_eq!(h.db.channel_get("chan-1").await.unwrap().playback_id, "pb-1");

    // a stale playback finishing leaves the current one alone
    let stale = json!({ "id": "pb-0", "target_uri": "channel:chan-1", "state": "done" });
    h.dispatcher
        .dispatch(frame("PlaybackFinished", json!({ "playback": stale })))
        .await
        .unwrap();
    assert_eq!(h.db.channel_get("chan-1").await.unwrap().playback_id, "pb-1");

    let done = json!({ "id": "pb-1", "media_uri": "sound:hello", "target_uri": "channel:chan-1", "state": "done" });
    h.dispatcher
        .dispatch(frame("PlaybackFinished", json!({ "playback": done })))
        .await
        .unwrap();
    assert_eq!(h.db.channel_get("chan-1").await.unwrap().playback_id, "");

    // unknown channel: nothing to do
    for event_type in ["PlaybackStarted", "PlaybackFinished"] {
        let playback = json!({ "id": "pb-2", "target_uri": "channel:ghost" });
        h.dispatcher
            .dispatch(frame(event_type, json!({ "playback": playback })))
            .await
            .unwrap();
    }
    assert!(h.ari.hangups().is_empty());
}

#[tokio::test]
async fn test_recording_events_reach_engine() {
    let h = Harness::new();
    let conference = h.create_conference(ConferenceType::Conference, 0).await;
    let recording = h.engine.recording_start(conference.id).await.unwrap();
    let ari_recording = json!({
        "name": recording.recording_name,
        "format": "wav",
        "state": "recording",
        "target_uri": format!("bridge:bridge-{}", conference.confbridge_id)
    });

    h.dispatcher
        .dispatch(frame("RecordingStarted", json!({ "recording": ari_recording.clone() })))
        .await
        .unwrap();
    let started = h.db.recording_get(recording.id).await.unwrap();
    assert_eq!(started.status, RecordingStatus::Recording);
    assert_eq!(started.tm_start, CANONICAL_TS);

    h.dispatcher
        .dispatch(frame("RecordingFinished", json!({ "recording": ari_recording })))
        .await
        .unwrap();
    assert!(h.engine.get(conference.id).await.unwrap().recording_id.is_nil());
}

#[tokio::test]
async fn test_dtmf_is_counted_only() {
    let h = Harness::new();
    create_channel(&h, "chan-1").await;
    h.dispatcher
        .dispatch(frame(
            "ChannelDtmfReceived",
            json!({ "digit": "5", "duration_ms": 120, "channel": channel_json("chan-1", "call") }),
        ))
        .await
        .unwrap();
    assert_eq!(h.metrics.get(ARI_EVENT_TOTAL, "ChannelDtmfReceived"), 1);
    assert!(h.ari.commands().is_empty());
}
