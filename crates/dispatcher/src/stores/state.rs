//! Alert tables and the snapshot transaction shared by the built-in stores

use serde::{Deserialize, Serialize};

use contracts::{
    ContractError, DistressEvent, EventId, EventRecord, EventStatus, NewNotification,
    NotificationId, NotificationRecord, UserId,
};

/// Event and notification tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertTables {
    pub events: Vec<EventRecord>,
    pub notifications: Vec<NotificationRecord>,
    next_event_id: EventId,
    next_notification_id: NotificationId,
}

impl Default for AlertTables {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            notifications: Vec::new(),
            next_event_id: 1,
            next_notification_id: 1,
        }
    }
}

impl AlertTables {
    pub fn insert_event(&mut self, event: &DistressEvent) -> EventId {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(EventRecord {
            id,
            event: event.clone(),
            status: EventStatus::Active,
        });
        id
    }

    pub fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<NotificationId, ContractError> {
        if self.find_event(notification.event_id).is_none() {
            return Err(ContractError::event_not_found(notification.event_id));
        }
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications
            .push(NotificationRecord::from_new(id, notification));
        Ok(id)
    }

    pub fn unread_for(&self, user_id: UserId) -> Vec<NotificationRecord> {
        self.notifications
            .iter()
            .filter(|n| n.recipient_id == user_id && !n.read)
            .cloned()
            .collect()
    }

    pub fn mark_read(&mut self, ids: &[NotificationId]) {
        for n in self.notifications.iter_mut() {
            if ids.contains(&n.id) {
                n.read = true;
            }
        }
    }

    pub fn find_event(&self, event_id: EventId) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn events(&self, user_id: Option<UserId>) -> Vec<EventRecord> {
        self.events
            .iter()
            .filter(|e| user_id.is_none_or(|id| e.event.user_id == id))
            .cloned()
            .collect()
    }

    pub fn set_event_status(
        &mut self,
        event_id: EventId,
        status: EventStatus,
    ) -> Result<(), ContractError> {
        let record = self
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| ContractError::event_not_found(event_id))?;
        record.status = status;
        Ok(())
    }
}

/// Snapshot transaction over [`AlertTables`]
///
/// `begin` clones the committed tables; writes go to the clone; `commit`
/// swaps it in, `rollback` drops it.
#[derive(Debug, Default)]
pub struct SnapshotTx {
    committed: AlertTables,
    pending: Option<AlertTables>,
}

impl SnapshotTx {
    pub fn new(committed: AlertTables) -> Self {
        Self {
            committed,
            pending: None,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin(&mut self, store: &str) -> Result<(), ContractError> {
        if self.pending.is_some() {
            return Err(ContractError::persistence(
                store,
                "transaction already open",
            ));
        }
        self.pending = Some(self.committed.clone());
        Ok(())
    }

    /// Tables visible to reads
    pub fn current(&self) -> &AlertTables {
        self.pending.as_ref().unwrap_or(&self.committed)
    }

    /// Committed tables only
    pub fn committed(&self) -> &AlertTables {
        &self.committed
    }

    /// Tables accepting writes
    pub fn staged(&mut self, store: &str) -> Result<&mut AlertTables, ContractError> {
        self.pending
            .as_mut()
            .ok_or_else(|| ContractError::persistence(store, "no open transaction"))
    }

    /// Promote the staged tables once `persist` accepts them
    pub fn commit_with<F>(&mut self, store: &str, persist: F) -> Result<(), ContractError>
    where
        F: FnOnce(&AlertTables) -> Result<(), ContractError>,
    {
        let staged = self
            .pending
            .as_ref()
            .ok_or_else(|| ContractError::persistence(store, "no open transaction"))?;
        persist(staged)?;
        if let Some(staged) = self.pending.take() {
            self.committed = staged;
        }
        Ok(())
    }

    pub fn rollback(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::AlertKind;

    fn event() -> DistressEvent {
        DistressEvent::now(1, 23.8103, 90.4125).unwrap()
    }

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

    #[test]
    fn test_ids_are_sequential() {
        let mut tables = AlertTables::default();
        assert_eq!(tables.insert_event(&event()), 1);
        assert_eq!(tables.insert_event(&event()), 2);
        assert_eq!(tables.insert_notification(&note(1, 2)).unwrap(), 1);
        assert_eq!(tables.insert_notification(&note(2, 3)).unwrap(), 2);
    }

    #[test]
    fn test_notification_requires_event() {
        let mut tables = AlertTables::default();
        let err = tables.insert_notification(&note(7, 2)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rollback_discards_writes() {
        let mut tx = SnapshotTx::default();
        tx.begin("t").unwrap();
        tx.staged("t").unwrap().insert_event(&event());
        assert_eq!(tx.current().events.len(), 1);
        tx.rollback();
        assert!(tx.current().events.is_empty());
        assert!(!tx.in_transaction());
    }

    #[test]
    fn test_failed_persist_keeps_pending() {
        let mut tx = SnapshotTx::default();
        tx.begin("t").unwrap();
        tx.staged("t").unwrap().insert_event(&event());
        let err = tx
            .commit_with("t", |_| Err(ContractError::persistence("t", "disk full")))
            .unwrap_err();
        assert!(matches!(err, ContractError::Persistence { .. }));
        assert!(tx.committed().events.is_empty());
        assert!(tx.in_transaction());
    }

    #[test]
    fn test_double_begin_rejected() {
        let mut tx = SnapshotTx::default();
        tx.begin("t").unwrap();
        assert!(tx.begin("t").is_err());
    }

    #[test]
    fn test_write_outside_transaction_rejected() {
        let mut tx = SnapshotTx::default();
        assert!(tx.staged("t").is_err());
    }
}
