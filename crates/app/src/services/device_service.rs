//! Device service — registration, removal and manual actions.

use lightkeeper_domain::device::{Device, DeviceState, DeviceTable};
use lightkeeper_domain::error::{DuplicateError, LightkeeperError, NotFoundError};
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::id::DeviceId;
use lightkeeper_domain::manual::ManualAction;
use lightkeeper_domain::time::Timestamp;

use crate::ports::{DeviceRepository, HistoryLog};

/// Application service for the device state table.
///
/// Every successful mutation appends exactly one [`HistoryEntry`].
pub struct DeviceService<D, H> {
    devices: D,
    history: H,
}

impl<D: DeviceRepository, H: HistoryLog> DeviceService<D, H> {
    /// Create a new service backed by the given repository and log.
    pub fn new(devices: D, history: H) -> Self {
        Self { devices, history }
    }

    /// Register a device with default state and log `"added"`.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::Duplicate`] if `id` is already registered,
    /// [`LightkeeperError::Validation`] if `name` is blank, or a storage error.
    #[tracing::instrument(skip(self, name, location), fields(device_id = %id))]
    pub async fn add_device(
        &self,
        id: DeviceId,
        name: impl Into<String>,
        location: impl Into<String>,
        now: Timestamp,
    ) -> Result<Device, LightkeeperError> {
        if self.devices.get_by_id(&id).await?.is_some() {
            return Err(DuplicateError {
                entity: "Device",
                id: id.to_string(),
            }
            .into());
        }
        let device = self
            .devices
            .create(Device::register(id, name, location)?)
            .await?;
        self.history
            .append(HistoryEntry::added(device.id.clone(), now))
            .await?;
        tracing::info!(name = %device.name, "device added");
        Ok(device)
    }

    /// Remove a device and log `"deleted"`. Earlier history is kept.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] when no device with `id` exists,
    /// or a storage error.
    #[tracing::instrument(skip(self), fields(device_id = %id))]
    pub async fn remove_device(
        &self,
        id: &DeviceId,
        now: Timestamp,
    ) -> Result<Device, LightkeeperError> {
        let device = self.get_device(id).await?;
        self.devices.delete(id).await?;
        self.history
            .append(HistoryEntry::deleted(id.clone(), now))
            .await?;
        tracing::info!("device removed");
        Ok(device)
    }

    /// Record a manual action on a device, marking it as overridden.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] for an unknown device,
    /// [`LightkeeperError::Validation`] for an out-of-range brightness, or a
    /// storage error.
    #[tracing::instrument(skip(self), fields(device_id = %id))]
    pub async fn apply_manual(
        &self,
        id: &DeviceId,
        action: ManualAction,
        now: Timestamp,
    ) -> Result<DeviceState, LightkeeperError> {
        let mut device = self.get_device(id).await?;
        let entry = device.apply_manual(action, now)?;
        device.state.validate()?;
        let device = self.devices.update(device).await?;
        self.history.append(entry).await?;
        tracing::debug!(
            is_on = device.state.is_on,
            brightness = %device.state.brightness,
            "manual action recorded"
        );
        Ok(device.state)
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_device(&self, id: &DeviceId) -> Result<Device, LightkeeperError> {
        self.devices.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// The whole device table.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<DeviceTable, LightkeeperError> {
        self.devices.get_all().await
    }
}
