//! [`JsonStore`] — in-memory tables backed by a JSON snapshot file.

use std::collections::HashSet;
use std::path::PathBuf;

use tokio::sync::RwLock;

use lightkeeper_app::ports::{DeviceRepository, HistoryLog, ScheduleRepository};
use lightkeeper_domain::device::{Device, DeviceTable};
use lightkeeper_domain::error::{DuplicateError, LightkeeperError, NotFoundError};
use lightkeeper_domain::history::HistoryEntry;
use lightkeeper_domain::id::{DeviceId, ScheduleEventId};
use lightkeeper_domain::schedule::ScheduleEvent;

use crate::error::StorageError;
use crate::snapshot::Snapshot;

/// Snapshot-backed store implementing every storage port.
///
/// Mutations are applied to a copy of the snapshot, written to disk, and only
/// then made visible, so a failed write leaves the in-memory state unchanged.
pub struct JsonStore {
    path: Option<PathBuf>,
    snapshot: RwLock<Snapshot>,
}

impl JsonStore {
    /// A store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Open the snapshot at `path`, starting empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file exists but is unreadable or
    /// malformed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let snapshot = Snapshot::load(&path).await?;
        tracing::info!(
            path = %path.display(),
            devices = snapshot.light_states.len(),
            events = snapshot.current_events.len(),
            history = snapshot.light_history.len(),
            "snapshot loaded"
        );
        Ok(Self {
            path: Some(path),
            snapshot: RwLock::new(snapshot),
        })
    }

    /// A copy of everything currently stored.
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    async fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        f(&*self.snapshot.read().await)
    }

    async fn mutate<T, F>(&self, f: F) -> Result<T, LightkeeperError>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, LightkeeperError> + Send,
        T: Send,
    {
        let mut guard = self.snapshot.write().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        if let Some(path) = &self.path {
            next.save(path).await?;
        }
        *guard = next;
        Ok(out)
    }
}

fn device_not_found(id: &DeviceId) -> LightkeeperError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}

impl DeviceRepository for JsonStore {
    async fn create(&self, device: Device) -> Result<Device, LightkeeperError> {
        self.mutate(|s| {
            if s.light_states.contains(&device.id) {
                return Err(DuplicateError {
                    entity: "Device",
                    id: device.id.to_string(),
                }
                .into());
            }
            s.light_states.insert(device.clone());
            Ok(device)
        })
        .await
    }

    async fn get_by_id(&self, id: &DeviceId) -> Result<Option<Device>, LightkeeperError> {
        Ok(self.read(|s| s.light_states.get(id).cloned()).await)
    }

    async fn get_all(&self) -> Result<DeviceTable, LightkeeperError> {
        Ok(self.read(|s| s.light_states.clone()).await)
    }

    async fn update(&self, device: Device) -> Result<Device, LightkeeperError> {
        self.mutate(|s| {
            if !s.light_states.contains(&device.id) {
                return Err(device_not_found(&device.id));
            }
            s.light_states.insert(device.clone());
            Ok(device)
        })
        .await
    }

    async fn replace_all(&self, table: DeviceTable) -> Result<(), LightkeeperError> {
        if self.read(|s| s.light_states == table).await {
            return Ok(());
        }
        self.mutate(|s| {
            s.light_states = table;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &DeviceId) -> Result<(), LightkeeperError> {
        self.mutate(|s| {
            s.light_states.remove(id);
            Ok(())
        })
        .await
    }
}

impl ScheduleRepository for JsonStore {
    async fn create(&self, event: ScheduleEvent) -> Result<ScheduleEvent, LightkeeperError> {
        self.mutate(|s| {
            s.current_events.push(event.clone());
            Ok(event)
        })
        .await
    }

    async fn get_by_id(
        &self,
        id: ScheduleEventId,
    ) -> Result<Option<ScheduleEvent>, LightkeeperError> {
        Ok(self
            .read(|s| s.current_events.iter().find(|e| e.id == id).cloned())
            .await)
    }

    async fn get_current(&self) -> Result<Vec<ScheduleEvent>, LightkeeperError> {
        Ok(self.read(|s| s.current_events.clone()).await)
    }

    async fn get_completed(&self) -> Result<Vec<ScheduleEvent>, LightkeeperError> {
        Ok(self.read(|s| s.completed_events.clone()).await)
    }

    async fn update(&self, event: ScheduleEvent) -> Result<ScheduleEvent, LightkeeperError> {
        self.mutate(|s| {
            let slot = s
                .current_events
                .iter_mut()
                .find(|e| e.id == event.id)
                .ok_or_else(|| NotFoundError {
                    entity: "ScheduleEvent",
                    id: event.id.to_string(),
                })?;
            *slot = event.clone();
            Ok(event)
        })
        .await
    }

    async fn delete(&self, id: ScheduleEventId) -> Result<(), LightkeeperError> {
        self.mutate(|s| {
            s.current_events.retain(|e| e.id != id);
            Ok(())
        })
        .await
    }

    async fn archive(&self, ids: Vec<ScheduleEventId>) -> Result<usize, LightkeeperError> {
        let ids: HashSet<ScheduleEventId> = ids.into_iter().collect();
        self.mutate(|s| {
            let (done, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut s.current_events)
                .into_iter()
                .partition(|e| ids.contains(&e.id));
            s.current_events = keep;
            let moved = done.len();
            s.completed_events.extend(done);
            Ok(moved)
        })
        .await
    }
}

impl HistoryLog for JsonStore {
    async fn append(&self, entry: HistoryEntry) -> Result<HistoryEntry, LightkeeperError> {
        self.mutate(|s| {
            s.light_history.push(entry.clone());
            Ok(entry)
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        Ok(self.read(|s| s.light_history.clone()).await)
    }

    async fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        Ok(self
            .read(|s| {
                s.light_history
                    .iter()
                    .filter(|e| &e.device_id == device_id)
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, LightkeeperError> {
        Ok(self
            .read(|s| s.light_history.iter().rev().take(limit).cloned().collect())
            .await)
    }
}
