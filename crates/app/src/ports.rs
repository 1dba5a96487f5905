//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod dispatcher;
pub mod history_log;
pub mod storage;

pub use dispatcher::CommandDispatcher;
pub use history_log::HistoryLog;
pub use storage::{DeviceRepository, ScheduleRepository};
