//! Device — a networked light and the controller's current belief about it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LightkeeperError, ValidationError};
use crate::id::DeviceId;
use crate::time::Timestamp;

/// Time after a manual action during which schedules may not override it.
pub const GRACE_PERIOD_MS: i64 = 5_000;

/// Brightness percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Brightness(u8);

impl Brightness {
    pub const MAX: Self = Self(100);

    /// Validate a raw percentage.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BrightnessOutOfRange`] outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(ValidationError::BrightnessOutOfRange(value)),
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Brightness> for u8 {
    fn from(b: Brightness) -> Self {
        b.0
    }
}

impl std::fmt::Display for Brightness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Authoritative on/off and brightness state of one device, plus the
/// bookkeeping the reconciliation engine needs to arbitrate between
/// schedules and manual actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    pub is_on: bool,
    pub brightness: Brightness,
    /// Informational only.
    pub power: u32,
    /// The most recent state-affecting action was manual.
    pub manual_override: bool,
    pub last_manual_action: Option<Timestamp>,
    /// Start of the schedule-driven OFF currently in force.
    pub last_off_event: Option<Timestamp>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            is_on: false,
            brightness: Brightness::default(),
            power: 100,
            manual_override: false,
            last_manual_action: None,
            last_off_event: None,
        }
    }
}

impl DeviceState {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OverrideWithoutTimestamp`] when the override
    /// flag is set but no manual action was recorded.
    pub fn validate(&self) -> Result<(), LightkeeperError> {
        if self.manual_override && self.last_manual_action.is_none() {
            return Err(ValidationError::OverrideWithoutTimestamp.into());
        }
        Ok(())
    }

    /// Whether a manual action taken less than [`GRACE_PERIOD_MS`] before
    /// `now` still shields this device from schedules.
    #[must_use]
    pub fn in_grace_period(&self, now: Timestamp) -> bool {
        if !self.manual_override {
            return false;
        }
        self.last_manual_action
            .is_some_and(|at| (now - at).num_milliseconds() < GRACE_PERIOD_MS)
    }

    /// Record that a user acted on this device at `now`.
    pub fn mark_manual(&mut self, now: Timestamp) {
        self.manual_override = true;
        self.last_manual_action = Some(now);
    }
}

/// A registered light: backend identity, display metadata and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(flatten)]
    pub state: DeviceState,
}

impl Device {
    /// Register a new device with default state (off, brightness 50, no override).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn register(
        id: DeviceId,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, LightkeeperError> {
        let device = Self {
            id,
            name: name.into().trim().to_string(),
            location: location.into().trim().to_string(),
            state: DeviceState::default(),
        };
        device.validate()?;
        Ok(device)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::Validation`] when the name is empty or the
    /// state invariants fail.
    pub fn validate(&self) -> Result<(), LightkeeperError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.state.validate()
    }
}

/// The device state table, keyed and iterated in device id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceTable(BTreeMap<DeviceId, Device>);

impl DeviceTable {
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &DeviceId) -> Option<&mut Device> {
        self.0.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.0.contains_key(id)
    }

    /// Insert or replace a device, returning the previous record if any.
    pub fn insert(&mut self, device: Device) -> Option<Device> {
        self.0.insert(device.id.clone(), device)
    }

    pub fn remove(&mut self, id: &DeviceId) -> Option<Device> {
        self.0.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.0.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.0.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Devices whose on/off state differs from `previous`, with their new state.
    ///
    /// Devices absent from `previous` are not reported.
    #[must_use]
    pub fn switched_since(&self, previous: &Self) -> Vec<(DeviceId, bool)> {
        self.iter()
            .filter_map(|device| {
                let before = previous.get(&device.id)?;
                (before.state.is_on != device.state.is_on)
                    .then(|| (device.id.clone(), device.state.is_on))
            })
            .collect()
    }
}

impl FromIterator<Device> for DeviceTable {
    fn from_iter<T: IntoIterator<Item = Device>>(iter: T) -> Self {
        Self(iter.into_iter().map(|d| (d.id.clone(), d)).collect())
    }
}

impl IntoIterator for DeviceTable {
    type Item = Device;
    type IntoIter = std::collections::btree_map::IntoValues<DeviceId, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}
