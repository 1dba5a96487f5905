//! History service — read side of the audit log.

use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::id::DeviceId;

use crate::ports::HistoryLog;

/// Read-only queries over the history log.
pub struct HistoryService<H> {
    log: H,
}

impl<H: HistoryLog> HistoryService<H> {
    pub fn new(log: H) -> Self {
        Self { log }
    }

    /// The whole log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        self.log.get_all().await
    }

    /// Entries for one device, even after it was deleted.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn for_device(&self, id: &DeviceId) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        self.log.find_by_device(id).await
    }

    /// The `limit` most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        self.log.get_recent(limit).await
    }
}
