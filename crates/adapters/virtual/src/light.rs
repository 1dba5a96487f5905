//! Virtual light — remembers the last on/off and brightness it was sent.

use std::sync::Mutex;

use lightkeeper_domain::device::Brightness;

/// What a simulated bulb currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightReading {
    pub is_on: bool,
    pub brightness: Brightness,
}

/// A simulated light that accepts commands.
#[derive(Debug)]
pub struct VirtualLight {
    state: Mutex<LightReading>,
    reachable: Mutex<bool>,
}

impl Default for VirtualLight {
    fn default() -> Self {
        Self {
            state: Mutex::new(LightReading::default()),
            reachable: Mutex::new(true),
        }
    }
}

impl VirtualLight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reading(&self) -> LightReading {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        *self
            .reachable
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set_reachable(&self, reachable: bool) {
        *self
            .reachable
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = reachable;
    }

    pub fn switch(&self, on: bool) {
        self.lock_state_mut().is_on = on;
    }

    pub fn set_brightness(&self, brightness: Brightness) {
        self.lock_state_mut().brightness = brightness;
    }

    fn lock_state_mut(&self) -> std::sync::MutexGuard<'_, LightReading> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
