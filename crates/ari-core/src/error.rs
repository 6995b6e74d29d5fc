use thiserror::Error;

/// Errors produced while turning a raw engine frame into a typed event
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload is not valid JSON or does not match the event schema
    #[error("Malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The `type` tag names an event this platform does not consume
    #[error("Unsupported event type: {0}")]
    UnsupportedType(String),

    /// The event timestamp is not in the engine's wire format
    #[error("Invalid event timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors talking to the telephony engine
#[derive(Error, Debug)]
pub enum AriError {
    /// The channel, bridge or recording does not exist on the engine
    #[error("Not found on engine: {0}")]
    NotFound(String),

    /// Transport level failure of a REST command
    #[error("ARI request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with a non-success status
    #[error("ARI returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// No REST endpoint is configured for the given engine instance
    #[error("No ARI endpoint configured for asterisk {0}")]
    UnknownAsterisk(String),

    /// Websocket session failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The outbound message bus refused a frame
    #[error("Publish failed: {0}")]
    Publish(String),
}

impl AriError {
    /// Create a new NotFound error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Self::WebSocket(msg.into())
    }

    /// Create a new Publish error
    pub fn publish<S: Into<String>>(msg: S) -> Self {
        Self::Publish(msg.into())
    }

    /// True when the engine reported the target as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, AriError>;
