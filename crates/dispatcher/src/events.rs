//! Panic event administration: listing, resolving, manual notifications

use chrono::Utc;
use tracing::{info, instrument};

use contracts::{
    AlertKind, AlertStore, ContactDirectory, ContractError, EventId, EventRecord, EventStatus,
    NewNotification, NotificationId, UserId,
};

use crate::dispatcher::ProximityDispatcher;
use crate::error::DispatcherError;
use crate::transaction;

impl<D, S> ProximityDispatcher<D, S>
where
    D: ContactDirectory,
    S: AlertStore,
{
    /// Committed panic events, optionally only those raised by `user_id`
    pub async fn events(&self, user_id: Option<UserId>) -> Result<Vec<EventRecord>, DispatcherError> {
        let name = self.store.name().to_string();
        self.store
            .events(user_id)
            .await
            .map_err(|e| DispatcherError::from_store(&name, e))
    }

    /// Mark an event resolved. Resolving twice is a no-op.
    #[instrument(name = "dispatcher_resolve_event", skip(self), fields(store = %self.store.name()))]
    pub async fn resolve_event(&mut self, event_id: EventId) -> Result<EventRecord, DispatcherError> {
        let record = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| DispatcherError::event_not_found(event_id))?;
        if record.status == EventStatus::Resolved {
            return Ok(record);
        }

        transaction::begin(&mut self.store).await?;
        let staged = self.store.set_event_status(event_id, EventStatus::Resolved).await;
        transaction::finish(&mut self.store, &self.metrics, staged).await?;

        info!(event_id, "Panic event resolved");
        Ok(EventRecord {
            status: EventStatus::Resolved,
            ..record
        })
    }

    /// Send an operator-written notification tied to an existing event
    #[instrument(
        name = "dispatcher_notify_manual",
        skip(self, message),
        fields(store = %self.store.name())
    )]
    pub async fn notify_manual(
        &mut self,
        event_id: EventId,
        sender_id: UserId,
        recipient_id: UserId,
        message: &str,
    ) -> Result<NotificationId, DispatcherError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DispatcherError::validation("message", "must not be empty"));
        }
        for id in [sender_id, recipient_id] {
            if self.directory.find_user(id).await?.is_none() {
                return Err(DispatcherError::user_not_found(id));
            }
        }
        if self.store.find_event(event_id).await?.is_none() {
            return Err(DispatcherError::event_not_found(event_id));
        }

        let notification = NewNotification {
            event_id,
            sender_id,
            recipient_id,
            message: message.to_string(),
            kind: AlertKind::Manual,
            created_at: Utc::now(),
        };

        transaction::begin(&mut self.store).await?;
        let staged: Result<NotificationId, ContractError> =
            self.store.insert_notification(&notification).await;
        let id = transaction::finish(&mut self.store, &self.metrics, staged).await?;

        info!(notification_id = id, event_id, recipient_id, "Manual notification sent");
        Ok(id)
    }
}
