//! # lightkeeper-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository` — the device state table
//!   - `ScheduleRepository` — current and completed schedule events
//!   - `HistoryLog` — append-only action history
//!   - `CommandDispatcher` — sends on/off/brightness commands to hardware
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService` — register, remove, manual actions
//!   - `ScheduleService` — create, edit, delete and archive schedule events
//!   - `HistoryService` — audit queries
//!   - `Reconciler` — one reconcile-then-commit pass
//!   - `LightController` — serializes every mutation with the pass that follows it
//!
//! ## Dependency rule
//! Depends on `lightkeeper-domain` only (plus `tokio::sync` for the pass lock).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod controller;
pub mod ports;
pub mod reconciler;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
