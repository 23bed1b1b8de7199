//! Notification rows and inbox view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EventId, NotificationId, UserId};

/// Why a recipient was alerted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertKind {
    /// Recipient is a direct contact of the triggering user
    DirectContact,
    /// Recipient is a contact of `via_id`, who is a direct contact
    FriendOfFriend { via_id: UserId, via_username: String },
    /// Written by an operator for an existing event
    Manual,
}

/// Notification staged for insert (no id yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub event_id: EventId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub message: String,
    pub kind: AlertKind,
    pub created_at: DateTime<Utc>,
}

/// Persisted notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub event_id: EventId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub message: String,
    pub kind: AlertKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Materialize a staged notification under `id`
    pub fn from_new(id: NotificationId, new: &NewNotification) -> Self {
        Self {
            id,
            event_id: new.event_id,
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            message: new.message.clone(),
            kind: new.kind.clone(),
            read: false,
            created_at: new.created_at,
        }
    }
}

/// Entry returned by inbox retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub id: NotificationId,
    pub message: String,
    /// RFC 3339 on the wire
    pub time: DateTime<Utc>,
}

impl From<&NotificationRecord> for InboxEntry {
    fn from(record: &NotificationRecord) -> Self {
        Self {
            id: record.id,
            message: record.message.clone(),
            time: record.created_at,
        }
    }
}
