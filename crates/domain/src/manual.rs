//! Manual actions — direct user commands that temporarily override schedules.

use serde::{Deserialize, Serialize};

use crate::device::{Brightness, Device};
use crate::error::LightkeeperError;
use crate::history::HistoryEntry;
use crate::time::Timestamp;

/// A direct command issued by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ManualAction {
    /// Flip the on/off state.
    Toggle,
    /// Set brightness to a percentage; validated when applied.
    SetBrightness(i64),
}

impl Device {
    /// Apply a manual action at `now`, marking the device as overridden.
    ///
    /// Returns the history entry describing what happened; the caller is
    /// responsible for appending it to the log.
    ///
    /// # Errors
    ///
    /// Returns [`LightkeeperError::Validation`] if a brightness value is out
    /// of range. The device is left untouched in that case.
    pub fn apply_manual(
        &mut self,
        action: ManualAction,
        now: Timestamp,
    ) -> Result<HistoryEntry, LightkeeperError> {
        let label = match action {
            ManualAction::Toggle => {
                self.state.is_on = !self.state.is_on;
                self.state.last_off_event = None;
                if self.state.is_on { "on" } else { "off" }.to_string()
            }
            ManualAction::SetBrightness(value) => {
                let brightness = Brightness::new(value)?;
                self.state.brightness = brightness;
                format!("brightness {brightness}")
            }
        };
        self.state.mark_manual(now);
        Ok(HistoryEntry::instant(self.id.clone(), label, now))
    }
}
