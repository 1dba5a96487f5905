//! # lightkeeper-domain
//!
//! Pure domain model for the lightkeeper lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** and their reconciled [`DeviceState`](device::DeviceState)
//! - Define **Schedule events** (time intervals that switch a device on or off)
//! - Define **History entries** (append-only audit records)
//! - Define **Manual actions** (toggle, set brightness) and how they mark an override
//! - Provide the pure [`reconcile`](reconcile::reconcile) function
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! The wall clock is never read by domain logic: every operation takes `now`.

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod history;
pub mod manual;
pub mod reconcile;
pub mod schedule;
