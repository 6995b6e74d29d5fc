//! Canonical platform timestamps
//!
//! The engine stamps its events as `2006-01-02T15:04:05.000-0700`. Everything the
//! platform persists uses UTC with microsecond precision, `2006-01-02 15:04:05.000000`,
//! so that plain string comparison orders timestamps chronologically.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::DecodeError;

/// Timestamp layout used on the engine websocket
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Timestamp layout used by the platform
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Sentinel for "not set yet" / "not deleted"
pub const DEFAULT_TIMESTAMP: &str = "9999-01-01 00:00:00.000000";

/// Earliest canonical timestamp, sorts before every real one
pub const EPOCH_FLOOR: &str = "0001-01-01 00:00:00.000000";

/// Convert an engine wire timestamp into the canonical layout (UTC)
pub fn from_wire(raw: &str) -> Result<String, DecodeError> {
    let parsed = DateTime::parse_from_str(raw, WIRE_FORMAT)
        .map_err(|_| DecodeError::InvalidTimestamp(raw.to_string()))?;
    Ok(format(&parsed.with_timezone(&Utc)))
}

/// Format a UTC instant in the canonical layout
pub fn format(at: &DateTime<Utc>) -> String {
    at.format(CANONICAL_FORMAT).to_string()
}

/// Parse a canonical timestamp back into an instant
pub fn parse(canonical: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(canonical, CANONICAL_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Current time in the canonical layout
pub fn now() -> String {
    format(&Utc::now())
}

/// Canonical timestamp `age` before now
pub fn ago(age: std::time::Duration) -> String {
    chrono::Duration::from_std(age)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .map(|at| format(&at))
        .unwrap_or_else(|| EPOCH_FLOOR.to_string())
}

/// True for the "not set" sentinel (and for empty strings)
pub fn is_unset(ts: &str) -> bool {
    ts.is_empty() || ts == DEFAULT_TIMESTAMP
}
