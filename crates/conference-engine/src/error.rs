use rvoip_ari_core::AriError;
use thiserror::Error;

/// Repository errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// No record with the given key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store refused or failed the operation
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DatabaseError {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
}

/// Errors returned by sibling services
#[derive(Error, Debug)]
pub enum PeerError {
    /// The request never got an answer
    #[error("Peer transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The peer answered with a failure status
    #[error("Peer returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The requested resource does not exist on the peer
    #[error("Peer resource not found: {0}")]
    NotFound(String),

    /// The answer could not be decoded
    #[error("Peer response decode error: {0}")]
    Decode(String),
}

impl PeerError {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::Status {
            status,
            message: msg.into(),
        }
    }
}

/// Coarse classification used by the RPC surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    Transient,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transient => "transient",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Conference engine errors
#[derive(Error, Debug)]
pub enum ConferenceError {
    /// Conference, call, flow or confbridge missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not allowed in the current conference state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Bridge metadata does not map to any conference role
    #[error("Classification error: {0}")]
    Classification(String),

    /// A mandatory peer RPC step failed
    #[error("Peer RPC failed: {0}")]
    PeerRpc(PeerError),

    /// Local persistence failed
    #[error("Persistence failed: {0}")]
    Persistence(DatabaseError),

    /// Engine command failed
    #[error("Engine command failed: {0}")]
    Engine(AriError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConferenceError {
    /// Create a new NotFound error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidInput error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new InvalidState error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new Classification error
    pub fn classification<S: Into<String>>(msg: S) -> Self {
        Self::Classification(msg.into())
    }

    /// Create a new Config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) | Self::Classification(_) => ErrorKind::InvalidInput,
            Self::InvalidState(_) => ErrorKind::Conflict,
            Self::PeerRpc(_) | Self::Engine(_) => ErrorKind::Transient,
            Self::Persistence(_) | Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<DatabaseError> for ConferenceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Persistence(other),
        }
    }
}

impl From<PeerError> for ConferenceError {
    fn from(err: PeerError) -> Self {
        match err {
            PeerError::NotFound(what) => Self::NotFound(what),
            other => Self::PeerRpc(other),
        }
    }
}

impl From<AriError> for ConferenceError {
    fn from(err: AriError) -> Self {
        match err {
            AriError::NotFound(what) => Self::NotFound(what),
            other => Self::Engine(other),
        }
    }
}

/// Result type for conference engine operations
pub type Result<T> = std::result::Result<T, ConferenceError>;
