//! AlertStore trait - transactional persistence for events and notifications
//!
//! Writes are only accepted between `begin` and `commit`/`rollback`.
//! Reads observe the open transaction when there is one.

use crate::{
    ContractError, DistressEvent, EventId, EventRecord, EventStatus, NewNotification,
    NotificationId, NotificationRecord, UserId,
};

/// Alert persistence trait
///
/// All store implementations must implement this trait.
#[trait_variant::make(AlertStore: Send)]
pub trait LocalAlertStore {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Open a transaction
    ///
    /// # Errors
    /// `Persistence` when a transaction is already open
    async fn begin(&mut self) -> Result<(), ContractError>;

    /// Stage a panic event, returning its id
    async fn insert_event(&mut self, event: &DistressEvent) -> Result<EventId, ContractError>;

    /// Stage a notification, returning its id
    async fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<NotificationId, ContractError>;

    /// Unread notifications addressed to `user_id`, in insertion order
    async fn unread_for(&self, user_id: UserId) -> Result<Vec<NotificationRecord>, ContractError>;

    /// Flag notifications as read
    async fn mark_read(&mut self, ids: &[NotificationId]) -> Result<(), ContractError>;

    /// Look up a recorded event
    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, ContractError>;

    /// Recorded events, optionally only those raised by `user_id`
    async fn events(&self, user_id: Option<UserId>) -> Result<Vec<EventRecord>, ContractError>;

    /// Stage a status change
    ///
    /// # Errors
    /// `NotFound` when the event does not exist
    async fn set_event_status(
        &mut self,
        event_id: EventId,
        status: EventStatus,
    ) -> Result<(), ContractError>;

    /// Make all staged writes durable
    async fn commit(&mut self) -> Result<(), ContractError>;

    /// Discard all staged writes
    async fn rollback(&mut self) -> Result<(), ContractError>;
}
