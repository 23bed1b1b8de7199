//! Fan-out planner - who gets alerted for a distress event
//!
//! Breadth-first expansion over the contact graph, bounded at depth 2:
//! - depth 1: direct contacts within the alert radius
//! - depth 2: only when depth 1 is empty, contacts of direct contacts within the radius
//!
//! A seen-set keyed by user id (seeded with the triggering user) keeps every
//! recipient unique and keeps the triggering user out.

use std::collections::{BTreeSet, HashSet};

use contracts::{
    haversine_km, AlertKind, AlertPolicy, ContactDirectory, ContractError, GeoPoint, UserId,
    UserProfile,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Which hop produced the recipients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanoutTier {
    /// At least one direct contact was in range; depth 2 was skipped
    DirectContacts,
    /// No direct contact in range; recipients are friends of friends
    FriendsOfFriends,
    /// Nobody in range at either depth
    NoneInRange,
}

impl FanoutTier {
    /// Label used for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectContacts => "direct",
            Self::FriendsOfFriends => "second_degree",
            Self::NoneInRange => "none",
        }
    }
}

/// One recipient chosen by the planner
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAlert {
    pub recipient: UserProfile,
    pub kind: AlertKind,
    /// Distance from the trigger to the recipient's last known position
    pub distance_km: f64,
}

impl PlannedAlert {
    /// Human readable alert text, naming the intermediate contact for depth 2
    pub fn message(&self, sender: &UserProfile) -> String {
        match &self.kind {
            AlertKind::FriendOfFriend { via_username, .. } => format!(
                "PANIC ALERT: {} (friend of {}) is in distress near you!",
                sender.username, via_username
            ),
            AlertKind::DirectContact | AlertKind::Manual => format!(
                "PANIC ALERT: Your friend {} is in distress near your location!",
                sender.username
            ),
        }
    }
}

/// Planner output
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPlan {
    pub tier: FanoutTier,
    pub alerts: Vec<PlannedAlert>,
}

impl AlertPlan {
    /// Recipient ids
    pub fn recipient_ids(&self) -> BTreeSet<UserId> {
        self.alerts.iter().map(|a| a.recipient.id).collect()
    }

    /// Closest recipient distance
    pub fn nearest_km(&self) -> Option<f64> {
        self.alerts.iter().map(|a| a.distance_km).reduce(f64::min)
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Applies an [`AlertPolicy`] to the contact graph
#[derive(Debug, Clone, Copy)]
pub struct FanoutPlanner {
    policy: AlertPolicy,
}

impl FanoutPlanner {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Distance in km under the policy's earth radius
    pub fn distance_km(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        haversine_km(a, b, self.policy.earth_radius_km)
    }

    /// Distance to `candidate` when it has a location inside the radius
    fn in_range(&self, origin: GeoPoint, candidate: &UserProfile) -> Option<f64> {
        let point = candidate.last_known?;
        let distance = self.distance_km(origin, point);
        (distance <= self.policy.radius_km).then_some(distance)
    }

    /// Plan the recipients for `sender` raising an alert at `origin`
    #[instrument(
        name = "fanout_plan",
        skip(self, directory, sender),
        fields(user_id = sender.id, radius_km = self.policy.radius_km)
    )]
    pub async fn plan<D: ContactDirectory>(
        &self,
        directory: &D,
        sender: &UserProfile,
        origin: GeoPoint,
    ) -> Result<AlertPlan, ContractError> {
        let mut seen: HashSet<UserId> = HashSet::from([sender.id]);
        let mut alerts = Vec::new();

        let direct = directory.contacts_of(sender.id).await?;
        for contact in &direct {
            if seen.contains(&contact.id) {
                continue;
            }
            if let Some(distance_km) = self.in_range(origin, contact) {
                seen.insert(contact.id);
                alerts.push(PlannedAlert {
                    recipient: contact.clone(),
                    kind: AlertKind::DirectContact,
                    distance_km,
                });
            }
        }

        // First successful hop wins, depth 2 is not consulted.
        if !alerts.is_empty() {
            debug!(recipients = alerts.len(), "Direct contacts in range");
            return Ok(AlertPlan {
                tier: FanoutTier::DirectContacts,
                alerts,
            });
        }

        for via in &direct {
            let second = match directory.contacts_of(via.id).await {
                Ok(contacts) => contacts,
                Err(e) if e.is_not_found() => {
                    warn!(via_id = via.id, "Contact vanished from directory, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for candidate in second {
                if seen.contains(&candidate.id) {
                    continue;
                }
                if let Some(distance_km) = self.in_range(origin, &candidate) {
                    seen.insert(candidate.id);
                    alerts.push(PlannedAlert {
                        recipient: candidate,
                        kind: AlertKind::FriendOfFriend {
                            via_id: via.id,
                            via_username: via.username.clone(),
                        },
                        distance_km,
                    });
                }
            }
        }

        let tier = if alerts.is_empty() {
            FanoutTier::NoneInRange
        } else {
            FanoutTier::FriendsOfFriends
        };
        debug!(recipients = alerts.len(), tier = tier.as_str(), "Second-degree expansion done");

        Ok(AlertPlan { tier, alerts })
    }
}

impl Default for FanoutPlanner {
    fn default() -> Self {
        Self::new(AlertPolicy::default())
    }
}
