//! Store implementations
//!
//! Contains MemoryDirectory, MemoryAlertStore and FileAlertStore.

mod directory;
mod file;
mod memory;
mod state;

pub use self::directory::MemoryDirectory;
pub use self::file::{FileAlertStore, FileStoreConfig};
pub use self::memory::MemoryAlertStore;

use contracts::{
    AlertStore, ContractError, DistressEvent, EventId, EventRecord, EventStatus,
    NewNotification, NotificationId, NotificationRecord, StoreConfig, StoreKind, UserId,
};
use tracing::instrument;

use crate::error::DispatcherError;

/// Store selected by configuration
#[derive(Debug)]
pub enum ConfiguredStore {
    Memory(MemoryAlertStore),
    File(FileAlertStore),
}

/// Open the store named by the `[store]` section
#[instrument(name = "dispatcher_open_store", skip(config), fields(kind = ?config.kind))]
pub fn open_store(config: &StoreConfig) -> Result<ConfiguredStore, DispatcherError> {
    match config.kind {
        StoreKind::Memory => Ok(ConfiguredStore::Memory(MemoryAlertStore::new("memory"))),
        StoreKind::File => {
            let store = FileAlertStore::from_store_config("file", config)
                .map_err(|e| DispatcherError::store_creation("file", e.to_string()))?;
            Ok(ConfiguredStore::File(store))
        }
    }
}

impl AlertStore for ConfiguredStore {
    fn name(&self) -> &str {
        match self {
            Self::Memory(s) => s.name(),
            Self::File(s) => s.name(),
        }
    }

    async fn begin(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Memory(s) => s.begin().await,
            Self::File(s) => s.begin().await,
        }
    }

    async fn insert_event(&mut self, event: &DistressEvent) -> Result<EventId, ContractError> {
        match self {
            Self::Memory(s) => s.insert_event(event).await,
            Self::File(s) => s.insert_event(event).await,
        }
    }

    async fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<NotificationId, ContractError> {
        match self {
            Self::Memory(s) => s.insert_notification(notification).await,
            Self::File(s) => s.insert_notification(notification).await,
        }
    }

    async fn unread_for(&self, user_id: UserId) -> Result<Vec<NotificationRecord>, ContractError> {
        match self {
            Self::Memory(s) => s.unread_for(user_id).await,
            Self::File(s) => s.unread_for(user_id).await,
        }
    }

    async fn mark_read(&mut self, ids: &[NotificationId]) -> Result<(), ContractError> {
        match self {
            Self::Memory(s) => s.mark_read(ids).await,
            Self::File(s) => s.mark_read(ids).await,
        }
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, ContractError> {
        match self {
            Self::Memory(s) => s.find_event(event_id).await,
            Self::File(s) => s.find_event(event_id).await,
        }
    }

    async fn events(&self, user_id: Option<UserId>) -> Result<Vec<EventRecord>, ContractError> {
        match self {
            Self::Memory(s) => s.events(user_id).await,
            Self::File(s) => s.events(user_id).await,
        }
    }

    async fn set_event_status(
        &mut self,
        event_id: EventId,
        status: EventStatus,
    ) -> Result<(), ContractError> {
        match self {
            Self::Memory(s) => s.set_event_status(event_id, status).await,
            Self::File(s) => s.set_event_status(event_id, status).await,
        }
    }

    async fn commit(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Memory(s) => s.commit().await,
            Self::File(s) => s.commit().await,
        }
    }

    async fn rollback(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Memory(s) => s.rollback().await,
            Self::File(s) => s.rollback().await,
        }
    }
}
