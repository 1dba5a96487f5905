//! Reconciliation engine — decides the authoritative state of every device.
//!
//! [`reconcile`] is a pure function of `now`, the current device table and
//! the schedule. It never fails and performs no IO; callers persist the
//! returned table.
//!
//! Per device, in order:
//!
//! 1. A device inside its manual grace period is left exactly as it is.
//! 2. A device with no active event and no manual override is switched off.
//!    ON events therefore only hold a light on while they are active.
//! 3. A device with active events takes the action of the latest-starting
//!    one (ties broken by event id), which also clears the manual override
//!    and records or clears `last_off_event`.
//!
//! Brightness is never changed by schedules.

use crate::device::DeviceTable;
use crate::schedule::{ScheduleAction, ScheduleEvent};
use crate::time::Timestamp;

/// Output of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The fully rebuilt device table.
    pub devices: DeviceTable,
    /// Events active at `now`, ordered by start then id.
    pub active_events: Vec<ScheduleEvent>,
}

/// Compute the next device table from the schedule at `now`.
///
/// Events are assumed to have passed [`ScheduleEvent::validate`]. Active
/// events that target a device missing from `devices` are still reported
/// but never create a table entry.
#[must_use]
pub fn reconcile(now: Timestamp, devices: &DeviceTable, events: &[ScheduleEvent]) -> Reconciliation {
    let mut active_events: Vec<ScheduleEvent> = events
        .iter()
        .filter(|event| event.is_active_at(now))
        .cloned()
        .collect();
    active_events.sort_by_key(|event| (event.start, event.id));

    let mut next = devices.clone();

    for device in next.iter_mut() {
        if device.state.in_grace_period(now) {
            continue;
        }
        let scheduled = active_events.iter().any(|e| e.device_id == device.id);
        if !scheduled && !device.state.manual_override {
            device.state.is_on = false;
        }
    }

    // Ascending order: the latest-starting event is applied last and wins.
    for event in &active_events {
        let Some(device) = next.get_mut(&event.device_id) else {
            continue;
        };
        let state = &mut device.state;
        if state.in_grace_period(now) {
            continue;
        }
        state.is_on = event.action == ScheduleAction::On;
        state.manual_override = false;
        state.last_off_event = match event.action {
            ScheduleAction::Off => Some(event.start),
            ScheduleAction::On => None,
        };
    }

    Reconciliation {
        devices: next,
        active_events,
    }
}
