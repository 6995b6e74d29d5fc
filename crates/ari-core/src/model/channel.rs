//! Channel model
//!
//! A [`Channel`] is one call leg as tracked by the engine. Instances handed out by the
//! repository are snapshots; mutation happens field by field through the store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::types::AriChannel;
use crate::timestamp::DEFAULT_TIMESTAMP;

/// Channel variable carrying the platform channel type
pub const VAR_TYPE: &str = "VB-TYPE";
/// Channel variable carrying the call direction
pub const VAR_DIRECTION: &str = "VB-DIRECTION";
/// Dialplan context the channel was started in
pub const VAR_CONTEXT: &str = "CONTEXT";
/// SIP Call-ID of the underlying dialog
pub const VAR_SIP_CALL_ID: &str = "SIP_CALLID";
/// SIP transport of the underlying dialog
pub const VAR_SIP_TRANSPORT: &str = "SIP_TRANSPORT";

/// Channel technology, taken from the channel name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tech {
    #[default]
    #[serde(rename = "")]
    None,
    Pjsip,
    Sip,
    Local,
    Snoop,
}

impl Tech {
    /// Derive the technology from a name such as `PJSIP/call-in-000001`
    pub fn from_channel_name(name: &str) -> Self {
        let prefix = match name.split_once('/') {
            Some((prefix, _)) => prefix,
            None => return Tech::None,
        };
        match prefix.to_ascii_lowercase().as_str() {
            "pjsip" => Tech::Pjsip,
            "sip" => Tech::Sip,
            "local" => Tech::Local,
            "snoop" => Tech::Snoop,
            _ => Tech::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tech::None => "",
            Tech::Pjsip => "pjsip",
            Tech::Sip => "sip",
            Tech::Local => "local",
            Tech::Snoop => "snoop",
        }
    }
}

/// Engine channel state, spelled the way ARI spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelState {
    #[serde(rename = "Down")]
    Down,
    #[serde(rename = "Rsrved")]
    Reserved,
    #[serde(rename = "OffHook")]
    OffHook,
    #[serde(rename = "Dialing")]
    Dialing,
    #[serde(rename = "Ring")]
    Ring,
    #[serde(rename = "Ringing")]
    Ringing,
    #[serde(rename = "Up")]
    Up,
    #[serde(rename = "Busy")]
    Busy,
    #[serde(rename = "Dialing Offhook")]
    DialingOffhook,
    #[serde(rename = "Pre-ring")]
    PreRing,
    #[default]
    #[serde(rename = "Unknown", other)]
    Unknown,
}

/// Platform role of a channel, from the `VB-TYPE` variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[default]
    #[serde(rename = "")]
    None,
    Call,
    Confbridge,
    Join,
    External,
    Recording,
    Snoop,
    Application,
}

impl ChannelType {
    /// Parse a `VB-TYPE` value; unknown values map to `None`
    pub fn from_variable(value: &str) -> Self {
        match value {
            "call" => ChannelType::Call,
            "confbridge" => ChannelType::Confbridge,
            "join" => ChannelType::Join,
            "external" => ChannelType::External,
            "recording" => ChannelType::Recording,
            "snoop" => ChannelType::Snoop,
            "application" => ChannelType::Application,
            _ => ChannelType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::None => "",
            ChannelType::Call => "call",
            ChannelType::Confbridge => "confbridge",
            ChannelType::Join => "join",
            ChannelType::External => "external",
            ChannelType::Recording => "recording",
            ChannelType::Snoop => "snoop",
            ChannelType::Application => "application",
        }
    }
}

/// Call direction, from the `VB-DIRECTION` variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    #[serde(rename = "")]
    None,
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn from_variable(value: &str) -> Self {
        match value {
            "incoming" => Direction::Incoming,
            "outgoing" => Direction::Outgoing,
            _ => Direction::None,
        }
    }
}

/// Reason passed to the engine when hanging up a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangupReason {
    Normal,
    Busy,
    Congestion,
    NoAnswer,
    Timeout,
    Rejected,
    Unallocated,
    NormalUnspecified,
    NumberIncomplete,
    CodecMismatch,
    Interworking,
    Failure,
    AnsweredElsewhere,
}

impl HangupReason {
    /// Value of the `reason` query parameter on `DELETE /channels/{id}`
    pub fn as_str(&self) -> &'static str {
        match self {
            HangupReason::Normal => "normal",
            HangupReason::Busy => "busy",
            HangupReason::Congestion => "congestion",
            HangupReason::NoAnswer => "no_answer",
            HangupReason::Timeout => "timeout",
            HangupReason::Rejected => "rejected",
            HangupReason::Unallocated => "unallocated",
            HangupReason::NormalUnspecified => "normal_unspecified",
            HangupReason::NumberIncomplete => "number_incomplete",
            HangupReason::CodecMismatch => "codec_mismatch",
            HangupReason::Interworking => "interworking",
            HangupReason::Failure => "failure",
            HangupReason::AnsweredElsewhere => "answered_elsewhere",
        }
    }
}

impl std::fmt::Display for HangupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call leg, identified by `(asterisk_id, id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub asterisk_id: String,
    pub id: String,
    pub name: String,

    pub channel_type: ChannelType,
    pub tech: Tech,

    pub sip_call_id: String,
    pub sip_transport: String,

    pub source_name: String,
    pub source_number: String,
    pub destination_name: String,
    pub destination_number: String,

    pub state: ChannelState,
    pub data: HashMap<String, serde_json::Value>,

    pub stasis_name: String,
    pub stasis_data: HashMap<String, String>,

    pub bridge_id: String,
    pub playback_id: String,

    pub hangup_cause: u16,
    pub direction: Direction,

    pub tm_create: String,
    pub tm_update: String,
    pub tm_answer: String,
    pub tm_ringing: String,
    pub tm_end: String,
}

impl Channel {
    /// Build a channel from the engine's snapshot carried by an event
    pub fn from_ari(asterisk_id: &str, ari: &AriChannel, timestamp: &str) -> Self {
        let mut channel = Self {
            asterisk_id: asterisk_id.to_string(),
            id: ari.id.clone(),
            name: ari.name.clone(),
            channel_type: ChannelType::None,
            tech: Tech::from_channel_name(&ari.name),
            sip_call_id: String::new(),
            sip_transport: String::new(),
            source_name: ari.caller.name.clone(),
            source_number: ari.caller.number.clone(),
            destination_name: ari.connected.name.clone(),
            destination_number: ari.dialplan.exten.clone(),
            state: ari.state,
            data: HashMap::new(),
            stasis_name: String::new(),
            stasis_data: HashMap::new(),
            bridge_id: String::new(),
            playback_id: String::new(),
            hangup_cause: 0,
            direction: Direction::None,
            tm_create: timestamp.to_string(),
            tm_update: DEFAULT_TIMESTAMP.to_string(),
            tm_answer: DEFAULT_TIMESTAMP.to_string(),
            tm_ringing: DEFAULT_TIMESTAMP.to_string(),
            tm_end: DEFAULT_TIMESTAMP.to_string(),
        };

        for (key, value) in &ari.channelvars {
            if let Some(text) = value.as_str() {
                channel.apply_variable(key, text);
            }
        }
        channel
    }

    /// Record an engine variable, deriving typed fields for the well known ones
    pub fn apply_variable(&mut self, name: &str, value: &str) {
        match name {
            VAR_TYPE => self.channel_type = ChannelType::from_variable(value),
            VAR_DIRECTION => self.direction = Direction::from_variable(value),
            VAR_SIP_CALL_ID => self.sip_call_id = value.to_string(),
            VAR_SIP_TRANSPORT => self.sip_transport = value.to_string(),
            _ => {}
        }
        self.data
            .insert(name.to_string(), serde_json::Value::String(value.to_string()));
    }

    /// String value stored in the data bag
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// True for legs that belong to a platform call
    pub fn is_call_leg(&self) -> bool {
        self.channel_type == ChannelType::Call
    }

    pub fn is_ended(&self) -> bool {
        self.tm_end != DEFAULT_TIMESTAMP
    }
}
