//! Proximity alert dispatcher - distress event to committed notifications

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use contracts::{
    AlertPolicy, AlertStore, ContactDirectory, ContractError, DistressEvent, EventId, GeoPoint,
    NewNotification, SafeRouteConfig, UserId, UserProfile,
};

use crate::error::DispatcherError;
use crate::fanout::{AlertPlan, FanoutPlanner, FanoutTier};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::stores::{open_store, ConfiguredStore, MemoryDirectory};
use crate::transaction;

/// Caller-facing summary of one dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub message: String,
    pub notified_count: usize,
    pub event_id: EventId,
    pub tier: FanoutTier,
    pub recipients: BTreeSet<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_km: Option<f64>,
}

impl DispatchReport {
    fn new(event_id: EventId, plan: &AlertPlan) -> Self {
        let recipients = plan.recipient_ids();
        Self {
            message: "Panic alert sent!".to_string(),
            notified_count: recipients.len(),
            event_id,
            tier: plan.tier,
            recipients,
            nearest_km: plan.nearest_km(),
        }
    }
}

/// Builder for creating a dispatcher from configuration
pub struct DispatcherBuilder {
    config: SafeRouteConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: SafeRouteConfig) -> Self {
        Self { config }
    }

    /// Seed the directory and open the configured store
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(users = self.config.users.len(), store = ?self.config.store.kind)
    )]
    pub fn build(self) -> Result<ProximityDispatcher<MemoryDirectory, ConfiguredStore>, DispatcherError> {
        let directory = MemoryDirectory::from_seeds("config", &self.config.users)?;
        let store = open_store(&self.config.store)?;
        Ok(ProximityDispatcher::new(directory, store, self.config.alert))
    }
}

/// Convenience function to create a dispatcher from configuration
pub fn create_dispatcher(
    config: SafeRouteConfig,
) -> Result<ProximityDispatcher<MemoryDirectory, ConfiguredStore>, DispatcherError> {
    DispatcherBuilder::new(config).build()
}

/// Decides who to alert for a distress event and records the alerts
///
/// Owns its contact directory and alert store; every operation runs as one
/// store transaction.
#[derive(Debug)]
pub struct ProximityDispatcher<D, S> {
    pub(crate) directory: D,
    pub(crate) store: S,
    planner: FanoutPlanner,
    pub(crate) metrics: Arc<DispatchMetrics>,
}

impl<D, S> ProximityDispatcher<D, S>
where
    D: ContactDirectory,
    S: AlertStore,
{
    /// Create a dispatcher over injected collaborators
    pub fn new(directory: D, store: S, policy: AlertPolicy) -> Self {
        Self {
            directory,
            store,
            planner: FanoutPlanner::new(policy),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &AlertPolicy {
        self.planner.policy()
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Give the collaborators back
    pub fn into_parts(self) -> (D, S) {
        (self.directory, self.store)
    }

    /// Alert the contacts of the triggering user and record the alerts
    ///
    /// # Errors
    /// - `Validation`: coordinates out of range, nothing written
    /// - `NotFound`: unknown triggering user, nothing written
    /// - `Persistence`: the transaction was rolled back, nothing written
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, event),
        fields(user_id = event.user_id, store = %self.store.name())
    )]
    pub async fn dispatch(&mut self, event: DistressEvent) -> Result<DispatchReport, DispatcherError> {
        let result = self.dispatch_inner(&event).await;
        match &result {
            Ok(report) => {
                self.metrics.record_dispatch(
                    report.notified_count,
                    report.tier == FanoutTier::FriendsOfFriends,
                );
                info!(
                    event_id = report.event_id,
                    notified = report.notified_count,
                    tier = report.tier.as_str(),
                    "Panic alert dispatched"
                );
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                warn!(error = %e, kind = e.kind().as_str(), "Panic alert failed");
            }
        }
        result
    }

    async fn dispatch_inner(&mut self, event: &DistressEvent) -> Result<DispatchReport, DispatcherError> {
        event.check()?;

        let sender = self
            .directory
            .find_user(event.user_id)
            .await?
            .ok_or_else(|| DispatcherError::user_not_found(event.user_id))?;

        let plan = self
            .planner
            .plan(&self.directory, &sender, event.location())
            .await?;

        transaction::begin(&mut self.store).await?;
        let staged = stage_dispatch(&mut self.store, event, &sender, &plan).await;
        let event_id = transaction::finish(&mut self.store, &self.metrics, staged).await?;

        Ok(DispatchReport::new(event_id, &plan))
    }

    /// Record a new last-known position for `user_id`
    #[instrument(name = "dispatcher_update_location", skip(self, point))]
    pub async fn update_location(
        &mut self,
        user_id: UserId,
        point: GeoPoint,
    ) -> Result<(), DispatcherError> {
        point.check()?;
        self.directory.update_location(user_id, point).await?;
        info!(user_id, lat = point.lat, lon = point.lon, "Location updated");
        Ok(())
    }
}

/// Stage the event row and one notification row per planned alert
async fn stage_dispatch<S: AlertStore>(
    store: &mut S,
    event: &DistressEvent,
    sender: &UserProfile,
    plan: &AlertPlan,
) -> Result<EventId, ContractError> {
    let event_id = store.insert_event(event).await?;
    let created_at = Utc::now();

    for alert in &plan.alerts {
        let notification = NewNotification {
            event_id,
            sender_id: sender.id,
            recipient_id: alert.recipient.id,
            message: alert.message(sender),
            kind: alert.kind.clone(),
            created_at,
        };
        store.insert_notification(&notification).await?;
    }

    Ok(event_id)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stores::MemoryAlertStore;
    use contracts::{
        EventRecord, EventStatus, NotificationId, NotificationRecord, UserSeed,
    };

    pub(crate) const DHAKA: (f64, f64) = (23.8103, 90.4125);
    pub(crate) const NEAR: (f64, f64) = (23.8110, 90.4130);
    pub(crate) const RAJSHAHI: (f64, f64) = (24.3636, 88.6241);

    /// Memory store that can be told to fail mid-transaction
    #[derive(Default)]
    pub(crate) struct FailingStore {
        pub inner: MemoryAlertStore,
        pub fail_on_notification: Option<usize>,
        pub fail_on_mark_read: bool,
        pub fail_commit: bool,
        pub inserted: usize,
    }

    impl AlertStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn begin(&mut self) -> Result<(), ContractError> {
            self.inserted = 0;
            self.inner.begin().await
        }

        async fn insert_event(&mut self, event: &DistressEvent) -> Result<EventId, ContractError> {
            self.inner.insert_event(event).await
        }

        async fn insert_notification(
            &mut self,
            notification: &NewNotification,
        ) -> Result<NotificationId, ContractError> {
            self.inserted += 1;
            if self.fail_on_notification == Some(self.inserted) {
                return Err(ContractError::persistence("failing", "injected insert failure"));
            }
            self.inner.insert_notification(notification).await
        }

        async fn unread_for(
            &self,
            user_id: UserId,
        ) -> Result<Vec<NotificationRecord>, ContractError> {
            self.inner.unread_for(user_id).await
        }

        async fn mark_read(&mut self, ids: &[NotificationId]) -> Result<(), ContractError> {
            if self.fail_on_mark_read {
                return Err(ContractError::persistence("failing", "injected update failure"));
            }
            self.inner.mark_read(ids).await
        }

        async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, ContractError> {
            self.inner.find_event(event_id).await
        }

        async fn events(&self, user_id: Option<UserId>) -> Result<Vec<EventRecord>, ContractError> {
            self.inner.events(user_id).await
        }

        async fn set_event_status(
            &mut self,
            event_id: EventId,
            status: EventStatus,
        ) -> Result<(), ContractError> {
            self.inner.set_event_status(event_id, status).await
        }

        async fn commit(&mut self) -> Result<(), ContractError> {
            if self.fail_commit {
                return Err(ContractError::persistence("failing", "injected commit failure"));
            }
            self.inner.commit().await
        }

        async fn rollback(&mut self) -> Result<(), ContractError> {
            self.inner.rollback().await
        }
    }

    pub(crate) fn seed(
        id: UserId,
        name: &str,
        at: Option<(f64, f64)>,
        contacts: Vec<UserId>,
    ) -> UserSeed {
        UserSeed {
            id,
            username: name.into(),
            lat: at.map(|p| p.0),
            lon: at.map(|p| p.1),
            contacts,
        }
    }

    /// nadia(1) at Dhaka, arif(2) next door, bithi(3) in Rajshahi, chandni(4) near
    /// but only reachable through bithi
    pub(crate) fn dhaka_directory() -> MemoryDirectory {
        MemoryDirectory::from_seeds(
            "test",
            &[
                seed(1, "nadia", Some(DHAKA), vec![2, 3]),
                seed(2, "arif", Some(NEAR), vec![1]),
                seed(3, "bithi", Some(RAJSHAHI), vec![1, 4]),
                seed(4, "chandni", Some(NEAR), vec![3]),
            ],
        )
        .unwrap()
    }

    pub(crate) fn dispatcher_with<S: AlertStore>(
        directory: MemoryDirectory,
        store: S,
    ) -> ProximityDispatcher<MemoryDirectory, S> {
        ProximityDispatcher::new(directory, store, AlertPolicy::default())
    }

    pub(crate) fn panic_at(user_id: UserId, at: (f64, f64)) -> DistressEvent {
        DistressEvent::now(user_id, at.0, at.1).unwrap()
    }

    #[tokio::test]
    async fn test_only_nearby_direct_contact_notified() {
        let mut dispatcher = dispatcher_with(dhaka_directory(), MemoryAlertStore::default());
        let report = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap();

        assert_eq!(report.message, "Panic alert sent!");
        assert_eq!(report.notified_count, 1);
        assert_eq!(report.recipients, BTreeSet::from([2]));
        assert_eq!(report.tier, FanoutTier::DirectContacts);

        let rows = dispatcher.store().committed_notifications();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recipient_id, 2);
        assert_eq!(rows[0].sender_id, 1);
        assert_eq!(rows[0].event_id, report.event_id);
        assert_eq!(
            rows[0].message,
            "PANIC ALERT: Your friend nadia is in distress near your location!"
        );
        assert_eq!(dispatcher.store().committed_events().len(), 1);
    }

    #[tokio::test]
    async fn test_friend_of_friend_fallback() {
        // nadia -> bithi (far) -> chandni (near); arif unlinked
        let directory = MemoryDirectory::from_seeds(
            "test",
            &[
                seed(1, "nadia", Some(DHAKA), vec![3]),
                seed(3, "bithi", Some(RAJSHAHI), vec![1, 4]),
                seed(4, "chandni", Some(NEAR), vec![3]),
            ],
        )
        .unwrap();
        let mut dispatcher = dispatcher_with(directory, MemoryAlertStore::default());
        let report = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap();

        assert_eq!(report.notified_count, 1);
        assert_eq!(report.recipients, BTreeSet::from([4]));
        assert_eq!(report.tier, FanoutTier::FriendsOfFriends);
        let rows = dispatcher.store().committed_notifications();
        assert_eq!(
            rows[0].message,
            "PANIC ALERT: nadia (friend of bithi) is in distress near you!"
        );
        assert_eq!(dispatcher.snapshot().fallback_count, 1);
    }

    #[tokio::test]
    async fn test_nobody_in_range_still_records_event() {
        let directory = MemoryDirectory::from_seeds(
            "test",
            &[
                seed(1, "nadia", Some(DHAKA), vec![3]),
                seed(3, "bithi", Some(RAJSHAHI), vec![1]),
            ],
        )
        .unwrap();
        let mut dispatcher = dispatcher_with(directory, MemoryAlertStore::default());
        let report = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap();

        assert_eq!(report.notified_count, 0);
        assert_eq!(report.tier, FanoutTier::NoneInRange);
        assert!(report.nearest_km.is_none());
        assert_eq!(dispatcher.store().committed_events().len(), 1);
        assert!(dispatcher.store().committed_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_writes_nothing() {
        let mut dispatcher = dispatcher_with(dhaka_directory(), MemoryAlertStore::default());
        let err = dispatcher.dispatch(panic_at(99, DHAKA)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(dispatcher.store().committed_events().is_empty());
        assert!(!dispatcher.store().in_transaction());
        assert_eq!(dispatcher.snapshot().failure_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_rejected() {
        let mut dispatcher = dispatcher_with(dhaka_directory(), MemoryAlertStore::default());
        let event = DistressEvent {
            user_id: 1,
            latitude: 95.0,
            longitude: 90.0,
            triggered_at: Utc::now(),
        };
        let err = dispatcher.dispatch(event).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(dispatcher.store().committed_events().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_rolls_back_everything() {
        let directory = MemoryDirectory::from_seeds(
            "test",
            &[
                seed(1, "nadia", Some(DHAKA), vec![2, 4]),
                seed(2, "arif", Some(NEAR), vec![]),
                seed(4, "chandni", Some(NEAR), vec![]),
            ],
        )
        .unwrap();
        let store = FailingStore {
            fail_on_notification: Some(2),
            ..Default::default()
        };
        let mut dispatcher = dispatcher_with(directory, store);
        let err = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        let inner = &dispatcher.store().inner;
        assert!(inner.committed_events().is_empty());
        assert!(inner.committed_notifications().is_empty());
        assert!(!inner.in_transaction());
        assert_eq!(dispatcher.snapshot().rollback_count, 1);
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back_everything() {
        let store = FailingStore {
            fail_commit: true,
            ..Default::default()
        };
        let mut dispatcher = dispatcher_with(dhaka_directory(), store);
        let err = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap_err();

        assert!(matches!(err, DispatcherError::Persistence { .. }));
        assert!(dispatcher.store().inner.committed_events().is_empty());
        assert!(!dispatcher.store().inner.in_transaction());
    }

    #[tokio::test]
    async fn test_each_dispatch_is_a_separate_event() {
        let mut dispatcher = dispatcher_with(dhaka_directory(), MemoryAlertStore::default());
        let first = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap();
        let second = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap();

        assert_ne!(first.event_id, second.event_id);
        assert_eq!(dispatcher.store().committed_notifications().len(), 2);
        assert_eq!(dispatcher.snapshot().dispatch_count, 2);
    }

    #[tokio::test]
    async fn test_location_update_changes_outcome() {
        let mut dispatcher = dispatcher_with(dhaka_directory(), MemoryAlertStore::default());
        // arif moves to Rajshahi; chandni (via bithi) is now the only one near
        let far = GeoPoint::new(RAJSHAHI.0, RAJSHAHI.1).unwrap();
        dispatcher.update_location(2, far).await.unwrap();

        let report = dispatcher.dispatch(panic_at(1, DHAKA)).await.unwrap();
        assert_eq!(report.recipients, BTreeSet::from([4]));

        let err = dispatcher.update_location(42, far).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_report_serializes_expected_fields() {
        let plan = AlertPlan {
            tier: FanoutTier::NoneInRange,
            alerts: vec![],
        };
        let json = serde_json::to_value(DispatchReport::new(7, &plan)).unwrap();
        assert_eq!(json["message"], "Panic alert sent!");
        assert_eq!(json["notified_count"], 0);
        assert!(json.get("nearest_km").is_none());
    }

    #[test]
    fn test_build_from_config() {
        let config = SafeRouteConfig {
            users: vec![seed(1, "nadia", Some(DHAKA), vec![])],
            ..Default::default()
        };
        let dispatcher = create_dispatcher(config).unwrap();
        assert_eq!(dispatcher.store().name(), "memory");
        assert_eq!(dispatcher.policy().radius_km, 5.0);
    }
}
