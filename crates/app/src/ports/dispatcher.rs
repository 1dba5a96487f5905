//! Command dispatcher port — delivers commands to physical devices.
//!
//! The dispatcher owns retry policy and transport. A successful return means
//! the device acknowledged the command; nothing else verifies hardware state.

use std::future::Future;

use lightkeeper_domain::device::Brightness;
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::id::DeviceId;

/// Sends on/off and brightness commands to devices.
pub trait CommandDispatcher {
    /// Switch a device on or off.
    fn switch(
        &self,
        device_id: &DeviceId,
        on: bool,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send;

    /// Set a device's brightness.
    fn set_brightness(
        &self,
        device_id: &DeviceId,
        brightness: Brightness,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send;
}

impl<T: CommandDispatcher + Send + Sync> CommandDispatcher for std::sync::Arc<T> {
    fn switch(
        &self,
        device_id: &DeviceId,
        on: bool,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        (**self).switch(device_id, on)
    }

    fn set_brightness(
        &self,
        device_id: &DeviceId,
        brightness: Brightness,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        (**self).set_brightness(device_id, brightness)
    }
}
