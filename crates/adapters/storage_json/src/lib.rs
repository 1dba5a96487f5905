//! # lightkeeper-adapter-storage-json
//!
//! Storage adapter keeping the device table, the schedule (current and
//! completed events) and the history log in memory, and writing the whole
//! set to one JSON file after every change.
//!
//! ## Responsibilities
//! - Implement [`DeviceRepository`](lightkeeper_app::ports::DeviceRepository),
//!   [`ScheduleRepository`](lightkeeper_app::ports::ScheduleRepository) and
//!   [`HistoryLog`](lightkeeper_app::ports::HistoryLog)
//! - Load the snapshot on startup (a missing file means an empty store)
//! - Replace the file atomically so a crash never leaves half a snapshot
//!
//! ## Dependency rule
//!
//! Depends on `lightkeeper-app` (port traits) and `lightkeeper-domain` only.

mod error;
mod snapshot;
mod store;

pub use error::StorageError;
pub use snapshot::Snapshot;
pub use store::JsonStore;
