//! DistressEvent - dispatcher input
//!
//! A panic trigger and its persisted record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ContractError, EventId, GeoPoint, UserId};

/// Panic trigger raised by a user
///
/// Created once per trigger, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DistressEvent {
    /// Triggering user
    pub user_id: UserId,

    /// Latitude of the trigger, [-90, 90]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    /// Longitude of the trigger, [-180, 180]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Trigger time
    #[serde(default = "Utc::now")]
    pub triggered_at: DateTime<Utc>,
}

impl DistressEvent {
    /// Create a validated event
    pub fn new(
        user_id: UserId,
        latitude: f64,
        longitude: f64,
        triggered_at: DateTime<Utc>,
    ) -> Result<Self, ContractError> {
        let event = Self {
            user_id,
            latitude,
            longitude,
            triggered_at,
        };
        event.check()?;
        Ok(event)
    }

    /// Create an event triggered now
    pub fn now(user_id: UserId, latitude: f64, longitude: f64) -> Result<Self, ContractError> {
        Self::new(user_id, latitude, longitude, Utc::now())
    }

    /// Re-run coordinate validation (events may arrive deserialized)
    pub fn check(&self) -> Result<(), ContractError> {
        self.location().check()?;
        self.validate()?;
        Ok(())
    }

    /// Trigger location
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

/// Lifecycle status of a recorded panic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Raised, not yet handled
    #[default]
    Active,
    /// Marked handled by an operator
    Resolved,
}

/// Persisted panic event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub event: DistressEvent,
    #[serde(default)]
    pub status: EventStatus,
}
