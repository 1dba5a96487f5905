//! Schedule service — the validated write path into the schedule store.
//!
//! The reconciliation engine trusts every event it reads, so all interval
//! and device-reference checks happen here.

use lightkeeper_domain::error::{LightkeeperError, NotFoundError};
use lightkeeper_domain::id::{DeviceId, ScheduleEventId};
use lightkeeper_domain::schedule::ScheduleEvent;
use lightkeeper_domain::time::Timestamp;

use crate::ports::{DeviceRepository, ScheduleRepository};

/// Application service for schedule events.
pub struct ScheduleService<S, D> {
    schedule: S,
    devices: D,
}

impl<S: ScheduleRepository, D: DeviceRepository> ScheduleService<S, D> {
    /// Create a new service backed by the given repositories.
    pub fn new(schedule: S, devices: D) -> Self {
        Self { schedule, devices }
    }

    /// Add an event to the current schedule.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::Validation`] for a malformed interval,
    /// [`LightkeeperError::NotFound`] if the target device is unknown, or a
    /// storage error.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, device_id = %event.device_id))]
    pub async fn create_event(&self, event: ScheduleEvent) -> Result<ScheduleEvent, LightkeeperError> {
        self.check(&event).await?;
        self.schedule.create(event).await
    }

    /// Replace an existing current event.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event), plus
    /// [`LightkeeperError::NotFound`] if the event does not exist.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, device_id = %event.device_id))]
    pub async fn update_event(&self, event: ScheduleEvent) -> Result<ScheduleEvent, LightkeeperError> {
        self.get_event(event.id).await?;
        self.check(&event).await?;
        self.schedule.update(event).await
    }

    /// Remove a current event.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] if the event does not exist, or
    /// a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: ScheduleEventId) -> Result<ScheduleEvent, LightkeeperError> {
        let event = self.get_event(id).await?;
        self.schedule.delete(id).await?;
        Ok(event)
    }

    /// Remove every current event targeting `device_id`, returning them.
    ///
    /// Completed events are kept.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn delete_events_for_device(
        &self,
        device_id: &DeviceId,
    ) -> Result<Vec<ScheduleEvent>, LightkeeperError> {
        let orphaned: Vec<ScheduleEvent> = self
            .schedule
            .get_current()
            .await?
            .into_iter()
            .filter(|event| &event.device_id == device_id)
            .collect();
        for event in &orphaned {
            self.schedule.delete(event.id).await?;
        }
        if !orphaned.is_empty() {
            tracing::info!(count = orphaned.len(), "dropped events of removed device");
        }
        Ok(orphaned)
    }

    /// Look up a current event by id.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] when no current event has `id`,
    /// or a storage error.
    pub async fn get_event(&self, id: ScheduleEventId) -> Result<ScheduleEvent, LightkeeperError> {
        self.schedule.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "ScheduleEvent",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Events the engine still considers.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_current(&self) -> Result<Vec<ScheduleEvent>, LightkeeperError> {
        self.schedule.get_current().await
    }

    /// Events that have ended and were archived.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_completed(&self) -> Result<Vec<ScheduleEvent>, LightkeeperError> {
        self.schedule.get_completed().await
    }

    /// Move every current event that can no longer become active at `now`
    /// into the completed set. Open-ended OFF events are never archived.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn archive_completed(
        &self,
        now: Timestamp,
    ) -> Result<Vec<ScheduleEventId>, LightkeeperError> {
        let finished: Vec<ScheduleEventId> = self
            .schedule
            .get_current()
            .await?
            .into_iter()
            .filter(|event| event.is_completed_at(now))
            .map(|event| event.id)
            .collect();
        if !finished.is_empty() {
            let moved = self.schedule.archive(finished.clone()).await?;
            tracing::debug!(moved, "archived completed events");
        }
        Ok(finished)
    }

    async fn check(&self, event: &ScheduleEvent) -> Result<(), LightkeeperError> {
        event.validate()?;
        if self.devices.get_by_id(&event.device_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Device",
                id: event.device_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
