//! History log port — append-only persistence for [`HistoryEntry`] records.

use std::future::Future;

use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::id::DeviceId;

/// Append-only store of history entries.
///
/// Implementations must never alter or drop an entry once appended.
pub trait HistoryLog {
    /// Append a new entry at the end of the log.
    fn append(
        &self,
        entry: HistoryEntry,
    ) -> impl Future<Output = Result<HistoryEntry, LightkeeperError>> + Send;

    /// Every entry, oldest first.
    fn get_all(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send;

    /// Entries for one device, oldest first, including entries written
    /// before the device was deleted.
    fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send;

    /// The most recent entries, newest first.
    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send;
}

impl<T: HistoryLog + Send + Sync> HistoryLog for std::sync::Arc<T> {
    fn append(
        &self,
        entry: HistoryEntry,
    ) -> impl Future<Output = Result<HistoryEntry, LightkeeperError>> + Send {
        (**self).append(entry)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send {
        (**self).get_all()
    }

    fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send {
        (**self).find_by_device(device_id)
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send {
        (**self).get_recent(limit)
    }
}
