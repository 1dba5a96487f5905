//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for schedule bounds, manual actions and history records.
pub type Timestamp = DateTime<Utc>;

/// Seconds since the epoch of the instant standing in for "no natural end"
/// (2100-01-01T00:00:00Z).
const OPEN_END_SECS: i64 = 4_102_444_800;

/// Return the current UTC time.
///
/// Only composition roots call this; domain logic receives `now` explicitly.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// The far-future instant used as the end of open-ended OFF events.
#[must_use]
pub fn open_end() -> Timestamp {
    DateTime::from_timestamp(OPEN_END_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
