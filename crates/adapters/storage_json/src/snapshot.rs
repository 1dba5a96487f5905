//! On-disk snapshot format.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lightkeeper_domain::device::DeviceTable;
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::schedule::ScheduleEvent;

use crate::error::StorageError;

/// Everything the controller persists, as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub light_states: DeviceTable,
    pub current_events: Vec<ScheduleEvent>,
    pub completed_events: Vec<ScheduleEvent>,
    pub light_history: Vec<HistoryEntry>,
}

impl Snapshot {
    /// Read a snapshot from `path`, or an empty one if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read,
    /// or [`StorageError::Json`] if it is not a valid snapshot.
    pub async fn load(path: &Path) -> Result<Self, StorageError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot found, starting empty");
                Ok(Self::default())
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Write the snapshot to a sibling temp file, then rename it over `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if encoding or any file operation fails.
    pub async fn save(&self, path: &Path) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
