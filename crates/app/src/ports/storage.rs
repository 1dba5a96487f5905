//! Storage port — repository traits for the device table and the schedule.

use std::future::Future;

use lightkeeper_domain::device::{Device, DeviceTable};
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::id::{DeviceId, ScheduleEventId};
use lightkeeper_domain::schedule::ScheduleEvent;

/// Persistence for the device state table.
pub trait DeviceRepository {
    /// Insert a new device.
    ///
    /// Fails with [`LightkeeperError::Duplicate`] if the id is taken.
    fn create(&self, device: Device)
    -> impl Future<Output = Result<Device, LightkeeperError>> + Send;

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, LightkeeperError>> + Send;

    /// The whole table.
    fn get_all(&self) -> impl Future<Output = Result<DeviceTable, LightkeeperError>> + Send;

    /// Replace an existing device.
    ///
    /// Fails with [`LightkeeperError::NotFound`] if the id is unknown.
    fn update(&self, device: Device)
    -> impl Future<Output = Result<Device, LightkeeperError>> + Send;

    /// Commit the table produced by a reconciliation pass.
    fn replace_all(
        &self,
        table: DeviceTable,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send;

    /// Remove a device. Removing an unknown id is a no-op.
    fn delete(&self, id: &DeviceId) -> impl Future<Output = Result<(), LightkeeperError>> + Send;
}

/// Persistence for schedule events.
///
/// *Current* events are the ones the engine reads; *completed* events can no
/// longer become active and are kept for display only.
pub trait ScheduleRepository {
    fn create(
        &self,
        event: ScheduleEvent,
    ) -> impl Future<Output = Result<ScheduleEvent, LightkeeperError>> + Send;

    fn get_by_id(
        &self,
        id: ScheduleEventId,
    ) -> impl Future<Output = Result<Option<ScheduleEvent>, LightkeeperError>> + Send;

    fn get_current(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduleEvent>, LightkeeperError>> + Send;

    fn get_completed(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduleEvent>, LightkeeperError>> + Send;

    /// Replace an existing current event.
    ///
    /// Fails with [`LightkeeperError::NotFound`] if the id is unknown.
    fn update(
        &self,
        event: ScheduleEvent,
    ) -> impl Future<Output = Result<ScheduleEvent, LightkeeperError>> + Send;

    /// Remove a current event. Removing an unknown id is a no-op.
    fn delete(
        &self,
        id: ScheduleEventId,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send;

    /// Move the given current events to the completed set, returning how
    /// many were moved.
    fn archive(
        &self,
        ids: Vec<ScheduleEventId>,
    ) -> impl Future<Output = Result<usize, LightkeeperError>> + Send;
}

impl<T: DeviceRepository + Send + Sync> DeviceRepository for std::sync::Arc<T> {
    fn create(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, LightkeeperError>> + Send {
        (**self).create(device)
    }

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, LightkeeperError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<DeviceTable, LightkeeperError>> + Send {
        (**self).get_all()
    }

    fn update(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, LightkeeperError>> + Send {
        (**self).update(device)
    }

    fn replace_all(
        &self,
        table: DeviceTable,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        (**self).replace_all(table)
    }

    fn delete(&self, id: &DeviceId) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        (**self).delete(id)
    }
}

impl<T: ScheduleRepository + Send + Sync> ScheduleRepository for std::sync::Arc<T> {
    fn create(
        &self,
        event: ScheduleEvent,
    ) -> impl Future<Output = Result<ScheduleEvent, LightkeeperError>> + Send {
        (**self).create(event)
    }

    fn get_by_id(
        &self,
        id: ScheduleEventId,
    ) -> impl Future<Output = Result<Option<ScheduleEvent>, LightkeeperError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_current(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduleEvent>, LightkeeperError>> + Send {
        (**self).get_current()
    }

    fn get_completed(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduleEvent>, LightkeeperError>> + Send {
        (**self).get_completed()
    }

    fn update(
        &self,
        event: ScheduleEvent,
    ) -> impl Future<Output = Result<ScheduleEvent, LightkeeperError>> + Send {
        (**self).update(event)
    }

    fn delete(
        &self,
        id: ScheduleEventId,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        (**self).delete(id)
    }

    fn archive(
        &self,
        ids: Vec<ScheduleEventId>,
    ) -> impl Future<Output = Result<usize, LightkeeperError>> + Send {
        (**self).archive(ids)
    }
}
