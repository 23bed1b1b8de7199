//! ContactDirectory trait - user and contact-graph lookup
//!
//! One-hop adjacency lookup; the dispatcher calls it twice for the second-degree expansion.

use serde::{Deserialize, Serialize};

use crate::{ContractError, GeoPoint, UserId};

/// Directory entry for a user (and for each of their contacts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    /// Last reported position; `None` when unknown
    #[serde(default)]
    pub last_known: Option<GeoPoint>,
}

/// Contact directory trait
#[trait_variant::make(ContactDirectory: Send)]
pub trait LocalContactDirectory {
    /// Directory name (used for logging)
    fn name(&self) -> &str;

    /// Resolve a user, `Ok(None)` when unknown
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, ContractError>;

    /// Direct contacts of `user_id` (outgoing edges)
    ///
    /// # Errors
    /// `NotFound` when `user_id` is unknown
    async fn contacts_of(&self, user_id: UserId) -> Result<Vec<UserProfile>, ContractError>;

    /// Record a new last-known position
    ///
    /// # Errors
    /// `NotFound` when `user_id` is unknown
    async fn update_location(
        &mut self,
        user_id: UserId,
        point: GeoPoint,
    ) -> Result<(), ContractError>;
}
