//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{TimeDelta, TimeZone, Utc};
use lightkeeper_domain::device::{Brightness, Device, DeviceTable};
use lightkeeper_domain::error::{DuplicateError, LightkeeperError, NotFoundError};
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::id::{DeviceId, ScheduleEventId};
use lightkeeper_domain::schedule::ScheduleEvent;
use lightkeeper_domain::time::Timestamp;

use crate::ports::{CommandDispatcher, DeviceRepository, HistoryLog, ScheduleRepository};

pub fn t() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

pub fn secs(n: i64) -> Timestamp {
    t() + TimeDelta::seconds(n)
}

pub fn id(raw: &str) -> DeviceId {
    DeviceId::new(raw).unwrap()
}

// ── In-memory store ────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStore {
    devices: Mutex<DeviceTable>,
    current: Mutex<Vec<ScheduleEvent>>,
    completed: Mutex<Vec<ScheduleEvent>>,
    history: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get_all_history(&self) -> Vec<HistoryEntry> {
        self.history.lock().unwrap().clone()
    }
}

impl DeviceRepository for InMemoryStore {
    fn create(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, LightkeeperError>> + Send {
        let mut table = self.devices.lock().unwrap();
        let result = if table.contains(&device.id) {
            Err(DuplicateError {
                entity: "Device",
                id: device.id.to_string(),
            }
            .into())
        } else {
            table.insert(device.clone());
            Ok(device)
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, LightkeeperError>> + Send {
        let r = self.devices.lock().unwrap().get(id).cloned();
        async { Ok(r) }
    }

    fn get_all(&self) -> impl Future<Output = Result<DeviceTable, LightkeeperError>> + Send {
        let r = self.devices.lock().unwrap().clone();
        async { Ok(r) }
    }

    fn update(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, LightkeeperError>> + Send {
        let mut table = self.devices.lock().unwrap();
        let result = if table.contains(&device.id) {
            table.insert(device.clone());
            Ok(device)
        } else {
            Err(NotFoundError {
                entity: "Device",
                id: device.id.to_string(),
            }
            .into())
        };
        async { result }
    }

    fn replace_all(
        &self,
        table: DeviceTable,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        *self.devices.lock().unwrap() = table;
        async { Ok(()) }
    }

    fn delete(&self, id: &DeviceId) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        self.devices.lock().unwrap().remove(id);
        async { Ok(()) }
    }
}

impl ScheduleRepository for InMemoryStore {
    fn create(
        &self,
        event: ScheduleEvent,
    ) -> impl Future<Output = Result<ScheduleEvent, LightkeeperError>> + Send {
        self.current.lock().unwrap().push(event.clone());
        async { Ok(event) }
    }

    fn get_by_id(
        &self,
        id: ScheduleEventId,
    ) -> impl Future<Output = Result<Option<ScheduleEvent>, LightkeeperError>> + Send {
        let r = self
            .current
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned();
        async { Ok(r) }
    }

    fn get_current(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduleEvent>, LightkeeperError>> + Send {
        let r = self.current.lock().unwrap().clone();
        async { Ok(r) }
    }

    fn get_completed(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduleEvent>, LightkeeperError>> + Send {
        let r = self.completed.lock().unwrap().clone();
        async { Ok(r) }
    }

    fn update(
        &self,
        event: ScheduleEvent,
    ) -> impl Future<Output = Result<ScheduleEvent, LightkeeperError>> + Send {
        let mut current = self.current.lock().unwrap();
        let result = match current.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(event)
            }
            None => Err(NotFoundError {
                entity: "ScheduleEvent",
                id: event.id.to_string(),
            }
            .into()),
        };
        async { result }
    }

    fn delete(
        &self,
        id: ScheduleEventId,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        self.current.lock().unwrap().retain(|e| e.id != id);
        async { Ok(()) }
    }

    fn archive(
        &self,
        ids: Vec<ScheduleEventId>,
    ) -> impl Future<Output = Result<usize, LightkeeperError>> + Send {
        let ids: HashSet<_> = ids.into_iter().collect();
        let mut current = self.current.lock().unwrap();
        let (done, keep): (Vec<_>, Vec<_>) =
            current.drain(..).partition(|e| ids.contains(&e.id));
        *current = keep;
        let moved = done.len();
        self.completed.lock().unwrap().extend(done);
        async move { Ok(moved) }
    }
}

impl HistoryLog for InMemoryStore {
    fn append(
        &self,
        entry: HistoryEntry,
    ) -> impl Future<Output = Result<HistoryEntry, LightkeeperError>> + Send {
        self.history.lock().unwrap().push(entry.clone());
        async { Ok(entry) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send {
        let r = self.history.lock().unwrap().clone();
        async { Ok(r) }
    }

    fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send {
        let r: Vec<_> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.device_id == device_id)
            .cloned()
            .collect();
        async { Ok(r) }
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, LightkeeperError>> + Send {
        let r: Vec<_> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        async { Ok(r) }
    }
}

// ── Spy dispatcher ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Switch(DeviceId, bool),
    Brightness(DeviceId, Brightness),
}

#[derive(Default)]
pub struct SpyDispatcher {
    pub commands: Mutex<Vec<Command>>,
    pub unreachable: Mutex<HashSet<DeviceId>>,
}

impl SpyDispatcher {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_for(&self, device_id: &DeviceId) {
        self.unreachable.lock().unwrap().insert(device_id.clone());
    }

    pub fn restore(&self, device_id: &DeviceId) {
        self.unreachable.lock().unwrap().remove(device_id);
    }

    pub fn sent(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    fn deliver(&self, command: Command) -> Result<(), LightkeeperError> {
        let target = match &command {
            Command::Switch(id, _) | Command::Brightness(id, _) => id.clone(),
        };
        if self.unreachable.lock().unwrap().contains(&target) {
            return Err(LightkeeperError::Dispatch(
                format!("device {target} unreachable").into(),
            ));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

impl CommandDispatcher for SpyDispatcher {
    fn switch(
        &self,
        device_id: &DeviceId,
        on: bool,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        let r = self.deliver(Command::Switch(device_id.clone(), on));
        async { r }
    }

    fn set_brightness(
        &self,
        device_id: &DeviceId,
        brightness: Brightness,
    ) -> impl Future<Output = Result<(), LightkeeperError>> + Send {
        let r = self.deliver(Command::Brightness(device_id.clone(), brightness));
        async { r }
    }
}
