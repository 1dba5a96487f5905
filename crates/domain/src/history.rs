//! History log entries — an append-only audit trail of device actions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, HistoryEntryId};
use crate::time::Timestamp;

pub const ADDED: &str = "added";
pub const DELETED: &str = "deleted";

/// One recorded action on a device.
///
/// Entries are never mutated once written and outlive the device they
/// describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub device_id: DeviceId,
    /// Free-form label such as `"on"`, `"brightness 42%"` or `"deleted"`.
    pub action: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub duration: Duration,
    pub timestamp: Timestamp,
}

impl HistoryEntry {
    /// A zero-length entry taking place at `now`.
    #[must_use]
    pub fn instant(device_id: DeviceId, action: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: HistoryEntryId::new(),
            device_id,
            action: action.into(),
            start: now,
            end: now,
            duration: Duration::ZERO,
            timestamp: now,
        }
    }

    #[must_use]
    pub fn added(device_id: DeviceId, now: Timestamp) -> Self {
        Self::instant(device_id, ADDED, now)
    }

    #[must_use]
    pub fn deleted(device_id: DeviceId, now: Timestamp) -> Self {
        Self::instant(device_id, DELETED, now)
    }
}
