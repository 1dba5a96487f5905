//! Reconciler — runs one reconcile-then-commit pass against the ports.
//!
//! Loads the device table and the current schedule, feeds them to the pure
//! [`reconcile`] function and commits the new table. It then compares the
//! table with the on/off state each light last acknowledged and asks the
//! dispatcher to switch every light that disagrees. A light only counts as
//! switched once the dispatcher returns `Ok`, so a failed command is sent
//! again on the next pass. Nothing is known about a light until it first
//! acknowledges, so the first pass after startup syncs every device.
//!
//! Schedule-driven transitions are not written to the history log.

use std::collections::HashMap;

use tokio::sync::Mutex;

use lightkeeper_domain::device::DeviceTable;
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::id::DeviceId;
use lightkeeper_domain::reconcile::reconcile;
use lightkeeper_domain::schedule::ScheduleEvent;
use lightkeeper_domain::time::Timestamp;

use crate::ports::{CommandDispatcher, DeviceRepository, ScheduleRepository};

/// Outcome of one committed reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Events active at the instant of the pass, ordered by start then id.
    pub active_events: Vec<ScheduleEvent>,
    /// Devices whose on/off state changed in the table, with their new state.
    pub switched: Vec<(DeviceId, bool)>,
    /// Commands the dispatcher acknowledged during the pass.
    pub dispatched: Vec<(DeviceId, bool)>,
    /// Devices the dispatcher failed to reach.
    pub dispatch_failures: Vec<DeviceId>,
}

/// Runs reconciliation passes.
pub struct Reconciler<D, S, C> {
    devices: D,
    schedule: S,
    dispatcher: C,
    acknowledged: Mutex<HashMap<DeviceId, bool>>,
}

impl<D, S, C> Reconciler<D, S, C>
where
    D: DeviceRepository,
    S: ScheduleRepository,
    C: CommandDispatcher,
{
    pub fn new(devices: D, schedule: S, dispatcher: C) -> Self {
        Self {
            devices,
            schedule,
            dispatcher,
            acknowledged: Mutex::new(HashMap::new()),
        }
    }

    /// Record that `device_id` confirmed being switched `on` outside a pass.
    pub async fn acknowledge(&self, device_id: &DeviceId, on: bool) {
        self.acknowledged.lock().await.insert(device_id.clone(), on);
    }

    /// Run one pass at `now` and commit its result.
    ///
    /// Callers must not run two passes, or a pass and a manual action,
    /// concurrently; [`LightController`](crate::controller::LightController)
    /// takes care of that.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading or committing fails. Dispatcher
    /// failures are not errors.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, now: Timestamp) -> Result<ReconcileReport, LightkeeperError> {
        let previous = self.devices.get_all().await?;
        let events = self.schedule.get_current().await?;

        let outcome = reconcile(now, &previous, &events);
        let switched = outcome.devices.switched_since(&previous);

        let mut acknowledged = self.acknowledged.lock().await;
        acknowledged.retain(|device_id, _| outcome.devices.contains(device_id));
        let pending = out_of_sync(&outcome.devices, &acknowledged);
        self.devices.replace_all(outcome.devices).await?;

        let mut dispatched = Vec::new();
        let mut dispatch_failures = Vec::new();
        for (device_id, on) in pending {
            match self.dispatcher.switch(&device_id, on).await {
                Ok(()) => {
                    acknowledged.insert(device_id.clone(), on);
                    dispatched.push((device_id, on));
                }
                Err(err) => {
                    tracing::warn!(
                        %device_id,
                        on,
                        error = %err,
                        "failed to dispatch switch command"
                    );
                    dispatch_failures.push(device_id);
                }
            }
        }

        tracing::debug!(
            active = outcome.active_events.len(),
            switched = switched.len(),
            dispatched = dispatched.len(),
            "reconciliation pass committed"
        );

        Ok(ReconcileReport {
            active_events: outcome.active_events,
            switched,
            dispatched,
            dispatch_failures,
        })
    }
}

/// Devices whose table state differs from what the light last acknowledged.
fn out_of_sync(
    table: &DeviceTable,
    acknowledged: &HashMap<DeviceId, bool>,
) -> Vec<(DeviceId, bool)> {
    table
        .iter()
        .filter(|device| acknowledged.get(&device.id) != Some(&device.state.is_on))
        .map(|device| (device.id.clone(), device.state.is_on))
        .collect()
}
