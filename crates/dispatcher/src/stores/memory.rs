//! MemoryAlertStore - process-local transactional store

use contracts::{
    AlertStore, ContractError, DistressEvent, EventId, EventRecord, EventStatus,
    NewNotification, NotificationId, NotificationRecord, UserId,
};
use tracing::{debug, instrument};

use super::state::{AlertTables, SnapshotTx};

/// In-memory store, used by tests and the `memory` backend
#[derive(Debug)]
pub struct MemoryAlertStore {
    name: String,
    tx: SnapshotTx,
}

impl MemoryAlertStore {
    /// Create an empty store
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tx: SnapshotTx::default(),
        }
    }

    /// Committed events (ignores any open transaction)
    pub fn committed_events(&self) -> &[EventRecord] {
        &self.tx.committed().events
    }

    /// Committed notifications (ignores any open transaction)
    pub fn committed_notifications(&self) -> &[NotificationRecord] {
        &self.tx.committed().notifications
    }

    /// Whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.tx.in_transaction()
    }

    fn tables(&self) -> &AlertTables {
        self.tx.current()
    }
}

impl Default for MemoryAlertStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl AlertStore for MemoryAlertStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "memory_store_begin", skip(self), fields(store = %self.name))]
    async fn begin(&mut self) -> Result<(), ContractError> {
        self.tx.begin(&self.name)
    }

    async fn insert_event(&mut self, event: &DistressEvent) -> Result<EventId, ContractError> {
        Ok(self.tx.staged(&self.name)?.insert_event(event))
    }

    async fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<NotificationId, ContractError> {
        self.tx
            .staged(&self.name)?
            .insert_notification(notification)
    }

    async fn unread_for(&self, user_id: UserId) -> Result<Vec<NotificationRecord>, ContractError> {
        Ok(self.tables().unread_for(user_id))
    }

    async fn mark_read(&mut self, ids: &[NotificationId]) -> Result<(), ContractError> {
        self.tx.staged(&self.name)?.mark_read(ids);
        Ok(())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, ContractError> {
        Ok(self.tables().find_event(event_id).cloned())
    }

    async fn events(&self, user_id: Option<UserId>) -> Result<Vec<EventRecord>, ContractError> {
        Ok(self.tables().events(user_id))
    }

    async fn set_event_status(
        &mut self,
        event_id: EventId,
        status: EventStatus,
    ) -> Result<(), ContractError> {
        self.tx
            .staged(&self.name)?
            .set_event_status(event_id, status)
    }

    #[instrument(name = "memory_store_commit", skip(self), fields(store = %self.name))]
    async fn commit(&mut self) -> Result<(), ContractError> {
        self.tx.commit_with(&self.name, |_| Ok(()))
    }

    #[instrument(name = "memory_store_rollback", skip(self), fields(store = %self.name))]
    async fn rollback(&mut self) -> Result<(), ContractError> {
        self.tx.rollback();
        debug!(store = %self.name, "Transaction rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::AlertKind;

    fn note(event_id: EventId, recipient_id: UserId) -> NewNotification {
        NewNotification {
            event_id,
            sender_id: 1,
            recipient_id,
            message: "alert".into(),
            kind: AlertKind::DirectContact,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_makes_rows_visible() {
        let mut store = MemoryAlertStore::default();
        store.begin().await.unwrap();
        let event = DistressEvent::now(1, 23.8, 90.4).unwrap();
        let event_id = store.insert_event(&event).await.unwrap();
        store.insert_notification(&note(event_id, 2)).await.unwrap();
        assert!(store.committed_events().is_empty());
        store.commit().await.unwrap();

        assert_eq!(store.committed_events().len(), 1);
        assert_eq!(store.committed_notifications().len(), 1);
        assert_eq!(store.unread_for(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_rows() {
        let mut store = MemoryAlertStore::default();
        store.begin().await.unwrap();
        let event = DistressEvent::now(1, 23.8, 90.4).unwrap();
        let event_id = store.insert_event(&event).await.unwrap();
        store.insert_notification(&note(event_id, 2)).await.unwrap();
        store.rollback().await.unwrap();

        assert!(store.committed_events().is_empty());
        assert!(store.unread_for(2).await.unwrap().is_empty());
        assert!(!store.in_transaction());
    }

    #[tokio::test]
    async fn test_write_without_begin_fails() {
        let mut store = MemoryAlertStore::default();
        let event = DistressEvent::now(1, 23.8, 90.4).unwrap();
        let err = store.insert_event(&event).await.unwrap_err();
        assert!(matches!(err, ContractError::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_mark_read_is_transactional() {
        let mut store = MemoryAlertStore::default();
        store.begin().await.unwrap();
        let event = DistressEvent::now(1, 23.8, 90.4).unwrap();
        let event_id = store.insert_event(&event).await.unwrap();
        let id = store.insert_notification(&note(event_id, 2)).await.unwrap();
        store.commit().await.unwrap();

        store.begin().await.unwrap();
        store.mark_read(&[id]).await.unwrap();
        store.rollback().await.unwrap();
        assert_eq!(store.unread_for(2).await.unwrap().len(), 1);

        store.begin().await.unwrap();
        store.mark_read(&[id]).await.unwrap();
        store.commit().await.unwrap();
        assert!(store.unread_for(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_status_and_filter() {
        let mut store = MemoryAlertStore::default();
        store.begin().await.unwrap();
        let a = store
            .insert_event(&DistressEvent::now(1, 23.8, 90.4).unwrap())
            .await
            .unwrap();
        store
            .insert_event(&DistressEvent::now(2, 23.8, 90.4).unwrap())
            .await
            .unwrap();
        store
            .set_event_status(a, EventStatus::Resolved)
            .await
            .unwrap();
        store.commit().await.unwrap();

        let mine = store.events(Some(1)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, EventStatus::Resolved);
        assert_eq!(store.events(None).await.unwrap().len(), 2);
        assert!(store.find_event(99).await.unwrap().is_none());
    }
}
