//! Light controller — the single entry point used by the daemon and any
//! outer surface (API, UI bridge).
//!
//! Every operation that touches the device table runs under one async lock,
//! and every mutation is followed by an immediate reconciliation pass so
//! readers see the new fact without waiting for the next tick. Manual
//! commands are sent to the device first and only recorded once the
//! dispatcher acknowledges them.

use tokio::sync::Mutex;

use lightkeeper_domain::device::{Brightness, Device, DeviceState, DeviceTable};
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::id::{DeviceId, ScheduleEventId};
use lightkeeper_domain::manual::ManualAction;
use lightkeeper_domain::schedule::ScheduleEvent;
use lightkeeper_domain::time::Timestamp;

use crate::ports::{CommandDispatcher, DeviceRepository, HistoryLog, ScheduleRepository};
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::services::device_service::DeviceService;
use crate::services::history_service::HistoryService;
use crate::services::schedule_service::ScheduleService;

/// Result of a mutation together with the pass that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub value: T,
    pub report: ReconcileReport,
}

/// Serializes mutations and reconciliation passes over shared ports.
pub struct LightController<D, S, H, C> {
    gate: Mutex<()>,
    devices: DeviceService<D, H>,
    schedule: ScheduleService<S, D>,
    history: HistoryService<H>,
    reconciler: Reconciler<D, S, C>,
    dispatcher: C,
}

impl<D, S, H, C> LightController<D, S, H, C>
where
    D: DeviceRepository + Clone,
    S: ScheduleRepository + Clone,
    H: HistoryLog + Clone,
    C: CommandDispatcher + Clone,
{
    /// Wire the controller from shared port handles (typically `Arc`s).
    pub fn new(devices: D, schedule: S, history: H, dispatcher: C) -> Self {
        Self {
            gate: Mutex::new(()),
            devices: DeviceService::new(devices.clone(), history.clone()),
            schedule: ScheduleService::new(schedule.clone(), devices.clone()),
            history: HistoryService::new(history),
            reconciler: Reconciler::new(devices, schedule, dispatcher.clone()),
            dispatcher,
        }
    }

    /// Periodic tick: archive finished events, then reconcile.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the pass cannot load or commit.
    pub async fn tick(&self, now: Timestamp) -> Result<ReconcileReport, LightkeeperError> {
        let _guard = self.gate.lock().await;
        self.schedule.archive_completed(now).await?;
        self.reconciler.run(now).await
    }

    /// Send a manual command to the device, record it once acknowledged, and
    /// reconcile.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] for an unknown device,
    /// [`LightkeeperError::Validation`] for an invalid brightness,
    /// [`LightkeeperError::Dispatch`] if the device did not acknowledge (the
    /// table is left untouched), or a storage error.
    #[tracing::instrument(skip(self), fields(device_id = %id))]
    pub async fn manual(
        &self,
        id: &DeviceId,
        action: ManualAction,
        now: Timestamp,
    ) -> Result<Applied<DeviceState>, LightkeeperError> {
        let _guard = self.gate.lock().await;
        let device = self.devices.get_device(id).await?;
        match action {
            ManualAction::Toggle => {
                let on = !device.state.is_on;
                self.dispatcher.switch(id, on).await?;
                self.reconciler.acknowledge(id, on).await;
            }
            ManualAction::SetBrightness(value) => {
                self.dispatcher
                    .set_brightness(id, Brightness::new(value)?)
                    .await?;
            }
        }
        let value = self.devices.apply_manual(id, action, now).await?;
        let report = self.reconciler.run(now).await?;
        Ok(Applied { value, report })
    }

    /// Register a device and reconcile.
    ///
    /// # Errors
    ///
    /// See [`DeviceService::add_device`].
    pub async fn add_device(
        &self,
        id: DeviceId,
        name: impl Into<String>,
        location: impl Into<String>,
        now: Timestamp,
    ) -> Result<Applied<Device>, LightkeeperError> {
        let _guard = self.gate.lock().await;
        let value = self.devices.add_device(id, name, location, now).await?;
        let report = self.reconciler.run(now).await?;
        Ok(Applied { value, report })
    }

    /// Remove a device together with its current schedule events, then
    /// reconcile. A device registered later under the same id starts with an
    /// empty schedule.
    ///
    /// # Errors
    ///
    /// See [`DeviceService::remove_device`].
    pub async fn remove_device(
        &self,
        id: &DeviceId,
        now: Timestamp,
    ) -> Result<Applied<Device>, LightkeeperError> {
        let _guard = self.gate.lock().await;
        let value = self.devices.remove_device(id, now).await?;
        self.schedule.delete_events_for_device(id).await?;
        let report = self.reconciler.run(now).await?;
        Ok(Applied { value, report })
    }

    /// Add a schedule event and reconcile.
    ///
    /// # Errors
    ///
    /// See [`ScheduleService::create_event`].
    pub async fn create_event(
        &self,
        event: ScheduleEvent,
        now: Timestamp,
    ) -> Result<Applied<ScheduleEvent>, LightkeeperError> {
        let _guard = self.gate.lock().await;
        let value = self.schedule.create_event(event).await?;
        let report = self.reconciler.run(now).await?;
        Ok(Applied { value, report })
    }

    /// Edit a schedule event and reconcile.
    ///
    /// # Errors
    ///
    /// See [`ScheduleService::update_event`].
    pub async fn update_event(
        &self,
        event: ScheduleEvent,
        now: Timestamp,
    ) -> Result<Applied<ScheduleEvent>, LightkeeperError> {
        let _guard = self.gate.lock().await;
        let value = self.schedule.update_event(event).await?;
        let report = self.reconciler.run(now).await?;
        Ok(Applied { value, report })
    }

    /// Delete a schedule event and reconcile.
    ///
    /// # Errors
    ///
    /// See [`ScheduleService::delete_event`].
    pub async fn delete_event(
        &self,
        id: ScheduleEventId,
        now: Timestamp,
    ) -> Result<Applied<ScheduleEvent>, LightkeeperError> {
        let _guard = self.gate.lock().await;
        let value = self.schedule.delete_event(id).await?;
        let report = self.reconciler.run(now).await?;
        Ok(Applied { value, report })
    }

    /// Current device table.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn devices(&self) -> Result<DeviceTable, LightkeeperError> {
        self.devices.list_devices().await
    }

    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] for an unknown device, or a
    /// storage error.
    pub async fn device(&self, id: &DeviceId) -> Result<Device, LightkeeperError> {
        self.devices.get_device(id).await
    }

    /// Full history log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        self.history.list().await
    }

    /// The read side of the history log.
    pub fn history_service(&self) -> &HistoryService<H> {
        &self.history
    }

    /// The read side of the schedule.
    pub fn schedule_service(&self) -> &ScheduleService<S, D> {
        &self.schedule
    }
}
