//! Schedule events — time intervals that switch a device on or off.

use serde::{Deserialize, Serialize};

use crate::error::{LightkeeperError, ValidationError};
use crate::id::{DeviceId, ScheduleEventId};
use crate::time::{Timestamp, open_end};

/// What a schedule event does to its device while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleAction {
    On,
    Off,
}

impl std::fmt::Display for ScheduleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// A calendar entry targeting one device.
///
/// `start` is inclusive and `end` exclusive. An OFF event without an `end`
/// holds the device off until superseded; an ON event without an `end` is
/// never active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: ScheduleEventId,
    pub device_id: DeviceId,
    pub action: ScheduleAction,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ScheduleEvent {
    /// Create a builder for constructing a [`ScheduleEvent`].
    #[must_use]
    pub fn builder() -> ScheduleEventBuilder {
        ScheduleEventBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidInterval`] when `end` is present and
    /// not strictly after `start`.
    pub fn validate(&self) -> Result<(), LightkeeperError> {
        match self.end {
            Some(end) if end <= self.start => Err(ValidationError::InvalidInterval.into()),
            _ => Ok(()),
        }
    }

    /// The exclusive end used to decide whether the event is active.
    #[must_use]
    pub fn effective_end(&self) -> Timestamp {
        match (self.end, self.action) {
            (Some(end), _) => end,
            (None, ScheduleAction::Off) => open_end(),
            (None, ScheduleAction::On) => self.start,
        }
    }

    #[must_use]
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        now >= self.start && now < self.effective_end()
    }

    /// Whether the event can never become active again after `now`.
    #[must_use]
    pub fn is_completed_at(&self, now: Timestamp) -> bool {
        self.effective_end() <= now
    }
}

/// Step-by-step builder for [`ScheduleEvent`].
#[derive(Debug, Default)]
pub struct ScheduleEventBuilder {
    id: Option<ScheduleEventId>,
    device_id: Option<DeviceId>,
    action: Option<ScheduleAction>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    title: Option<String>,
}

impl ScheduleEventBuilder {
    #[must_use]
    pub fn id(mut self, id: ScheduleEventId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ScheduleAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn start(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn end(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Consume the builder, validate, and return a [`ScheduleEvent`].
    ///
    /// The action defaults to [`ScheduleAction::On`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if no device was given,
    /// [`ValidationError::MissingStart`] if no start was given, or
    /// [`ValidationError::InvalidInterval`] if the interval is malformed.
    pub fn build(self) -> Result<ScheduleEvent, LightkeeperError> {
        let event = ScheduleEvent {
            id: self.id.unwrap_or_default(),
            device_id: self.device_id.ok_or(ValidationError::EmptyId)?,
            action: self.action.unwrap_or(ScheduleAction::On),
            start: self.start.ok_or(ValidationError::MissingStart)?,
            end: self.end,
            title: self.title,
        };
        event.validate()?;
        Ok(event)
    }
}
