//! Wire structures of the engine's websocket events

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ChannelState;

/// Fields shared by every event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventHeader {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub asterisk_id: String,
    /// Wire format on input, canonical once decoded
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallerId {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialplanCep {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub exten: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub app_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AriChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: ChannelState,
    #[serde(default)]
    pub caller: CallerId,
    #[serde(default)]
    pub connected: CallerId,
    #[serde(default)]
    pub accountcode: String,
    #[serde(default)]
    pub dialplan: DialplanCep,
    #[serde(default)]
    pub creationtime: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub channelvars: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AriBridge {
    pub id: String,
    #[serde(default)]
    pub technology: String,
    #[serde(default)]
    pub bridge_type: String,
    #[serde(default)]
    pub bridge_class: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub video_mode: String,
    #[serde(default)]
    pub video_source_id: String,
    #[serde(default)]
    pub creationtime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AriPlayback {
    pub id: String,
    #[serde(default)]
    pub media_uri: String,
    #[serde(default)]
    pub target_uri: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub state: String,
}

impl AriPlayback {
    /// Channel id when the playback targets a channel (`channel:<id>`)
    pub fn target_channel_id(&self) -> Option<&str> {
        self.target_uri.strip_prefix("channel:")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AriRecording {
    pub name: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub target_uri: String,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub cause: Option<String>,
}

impl AriRecording {
    /// Bridge id when the recording targets a bridge (`bridge:<id>`)
    pub fn target_bridge_id(&self) -> Option<&str> {
        self.target_uri.strip_prefix("bridge:")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCreated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub channel: AriChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDestroyed {
    #[serde(flatten)]
    pub header: EventHeader,
    #[serde(default)]
    pub cause: u16,
    #[serde(default)]
    pub cause_txt: String,
    pub channel: AriChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEnteredBridge {
    #[serde(flatten)]
    pub header: EventHeader,
    pub bridge: AriBridge,
    pub channel: AriChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLeftBridge {
    #[serde(flatten)]
    pub header: EventHeader,
    pub bridge: AriBridge,
    pub channel: AriChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelVarset {
    #[serde(flatten)]
    pub header: EventHeader,
    pub variable: String,
    #[serde(default)]
    pub value: String,
    /// Absent for global variables
    #[serde(default)]
    pub channel: Option<AriChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStateChange {
    #[serde(flatten)]
    pub header: EventHeader,
    pub channel: AriChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDtmfReceived {
    #[serde(flatten)]
    pub header: EventHeader,
    pub digit: String,
    #[serde(default)]
    pub duration_ms: u32,
    pub channel: AriChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeCreated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub bridge: AriBridge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeDestroyed {
    #[serde(flatten)]
    pub header: EventHeader,
    pub bridge: AriBridge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStarted {
    #[serde(flatten)]
    pub header: EventHeader,
    pub playback: AriPlayback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackFinished {
    #[serde(flatten)]
    pub header: EventHeader,
    pub playback: AriPlayback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingStarted {
    #[serde(flatten)]
    pub header: EventHeader,
    pub recording: AriRecording,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingFinished {
    #[serde(flatten)]
    pub header: EventHeader,
    pub recording: AriRecording,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StasisStart {
    #[serde(flatten)]
    pub header: EventHeader,
    #[serde(default)]
    pub args: Vec<String>,
    pub channel: AriChannel,
    #[serde(default)]
    pub replace_channel: Option<AriChannel>,
}

impl StasisStart {
    /// Stasis arguments of the form `key=value`; other arguments are skipped
    pub fn arg_pairs(&self) -> HashMap<String, String> {
        self.args
            .iter()
            .filter_map(|arg| arg.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
