//! # lightkeeper-adapter-virtual
//!
//! Virtual [`CommandDispatcher`] backed by simulated lights.
//!
//! Lights are created on first contact, so any device registered with the
//! controller can be driven without configuration. Individual lights can be
//! marked unreachable to exercise dispatch failures.
//!
//! ## Dependency rule
//!
//! Depends on `lightkeeper-app` (port traits) and `lightkeeper-domain` only.

mod light;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use lightkeeper_app::ports::CommandDispatcher;
use lightkeeper_domain::device::Brightness;
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::id::DeviceId;

pub use light::{LightReading, VirtualLight};

/// Errors reported by simulated lights.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    #[error("virtual light {0} is unreachable")]
    Unreachable(DeviceId),
}

impl From<VirtualError> for LightkeeperError {
    fn from(err: VirtualError) -> Self {
        Self::Dispatch(Box::new(err))
    }
}

/// Dispatcher that drives in-process virtual lights.
#[derive(Default)]
pub struct VirtualDispatcher {
    lights: Mutex<HashMap<DeviceId, Arc<VirtualLight>>>,
}

impl VirtualDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The simulated light for `id`, created on first use.
    #[must_use]
    pub fn light(&self, id: &DeviceId) -> Arc<VirtualLight> {
        let mut lights = self
            .lights
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        lights
            .entry(id.clone())
            .or_insert_with(|| Arc::new(VirtualLight::new()))
            .clone()
    }

    fn deliver(
        &self,
        id: &DeviceId,
        apply: impl FnOnce(&VirtualLight),
    ) -> Result<(), LightkeeperError> {
        let light = self.light(id);
        if !light.is_reachable() {
            return Err(VirtualError::Unreachable(id.clone()).into());
        }
        apply(&light);
        Ok(())
    }
}

impl CommandDispatcher for VirtualDispatcher {
    fn switch(
        &self,
        device_id: &DeviceId,
        on: bool,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        let result = self.deliver(device_id, |light| light.switch(on));
        if result.is_ok() {
            tracing::info!(%device_id, on, "virtual light switched");
        }
        async { result }
    }

    fn set_brightness(
        &self,
        device_id: &DeviceId,
        brightness: Brightness,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        let result = self.deliver(device_id, |light| light.set_brightness(brightness));
        if result.is_ok() {
            tracing::info!(%device_id, %brightness, "virtual light dimmed");
        }
        async { result }
    }
}
