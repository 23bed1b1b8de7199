//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> 分发器 -> 存储 的完整链路
//! - 文件存储的持久化与失败回滚
//! - 多任务共享分发器

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contract_defaults() {
        let config = contracts::SafeRouteConfig::default();
        assert_eq!(config.version, contracts::ConfigVersion::V1);
        assert_eq!(config.alert.radius_km, contracts::ALERT_RADIUS_KM);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::BTreeSet;
    use std::path::Path;
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DistressEvent, EventStatus, SafeRouteConfig, StoreKind};
    use dispatcher::{create_dispatcher, ErrorKind, FanoutTier};
    use tokio::sync::Mutex;

    /// Dhaka neighbourhood plus one contact in Rajshahi
    ///
    /// nadia(1) -> arif(2, ~0.09 km), bithi(3, ~180 km), dipu(5, no location)
    /// bithi(3) -> chandni(4, ~2 km from nadia)
    const CONFIG: &str = r#"
[alert]
radius_km = 5.0

[[users]]
id = 1
username = "nadia"
lat = 23.8103
lon = 90.4125
contacts = [2, 3, 5]

[[users]]
id = 2
username = "arif"
lat = 23.8110
lon = 90.4130
contacts = [1]

[[users]]
id = 3
username = "bithi"
lat = 24.3636
lon = 88.6241
contacts = [1, 4]

[[users]]
id = 4
username = "chandni"
lat = 23.7925
lon = 90.4078
contacts = [3]

[[users]]
id = 5
username = "dipu"
contacts = [1]
"#;

    fn load() -> SafeRouteConfig {
        ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap()
    }

    fn with_file_store(path: &Path) -> SafeRouteConfig {
        let mut config = load();
        config.store.kind = StoreKind::File;
        config.store.path = Some(path.to_path_buf());
        config
    }

    fn panic_at(user_id: i64, lat: f64, lon: f64) -> DistressEvent {
        DistressEvent::now(user_id, lat, lon).unwrap()
    }

    /// Nearby direct contact wins; the far one and the second degree stay quiet
    #[tokio::test]
    async fn test_e2e_direct_contact_alert() {
        let mut dispatcher = create_dispatcher(load()).unwrap();

        let report = dispatcher
            .dispatch(panic_at(1, 23.8103, 90.4125))
            .await
            .unwrap();

        assert_eq!(report.message, "Panic alert sent!");
        assert_eq!(report.notified_count, 1);
        assert_eq!(report.tier, FanoutTier::DirectContacts);
        assert_eq!(report.recipients, BTreeSet::from([2]));

        let inbox = dispatcher.list_unread(2).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(
            inbox[0].message,
            "PANIC ALERT: Your friend nadia is in distress near your location!"
        );
        assert!(dispatcher.list_unread(4).await.unwrap().is_empty());
        assert!(dispatcher.list_unread(1).await.unwrap().is_empty());
    }

    /// With arif out of range the alert falls through bithi to chandni
    #[tokio::test]
    async fn test_e2e_second_degree_fallback() {
        let mut dispatcher = create_dispatcher(load()).unwrap();
        let far = contracts::GeoPoint::new(22.3569, 91.7832).unwrap();
        dispatcher.update_location(2, far).await.unwrap();

        let report = dispatcher
            .dispatch(panic_at(1, 23.8103, 90.4125))
            .await
            .unwrap();

        assert_eq!(report.tier, FanoutTier::FriendsOfFriends);
        assert_eq!(report.recipients, BTreeSet::from([4]));
        let nearest = report.nearest_km.unwrap();
        assert!(nearest > 1.0 && nearest < 5.0, "nearest = {nearest}");

        let inbox = dispatcher.list_unread(4).await.unwrap();
        assert_eq!(
            inbox[0].message,
            "PANIC ALERT: nadia (friend of bithi) is in distress near you!"
        );
    }

    /// A user without a location can raise alerts but never receives them
    #[tokio::test]
    async fn test_e2e_user_without_location() {
        let mut dispatcher = create_dispatcher(load()).unwrap();

        let report = dispatcher
            .dispatch(panic_at(5, 23.8103, 90.4125))
            .await
            .unwrap();
        // dipu -> nadia (in range)
        assert_eq!(report.recipients, BTreeSet::from([1]));

        let report = dispatcher
            .dispatch(panic_at(1, 23.8103, 90.4125))
            .await
            .unwrap();
        assert!(!report.recipients.contains(&5));
    }

    #[tokio::test]
    async fn test_e2e_unknown_user_rejected() {
        let mut dispatcher = create_dispatcher(load()).unwrap();

        let err = dispatcher
            .dispatch(panic_at(404, 23.8103, 90.4125))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(dispatcher.events(None).await.unwrap().is_empty());
    }

    /// Committed alerts survive reopening the file store
    #[tokio::test]
    async fn test_e2e_file_store_durable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.json");

        {
            let mut dispatcher = create_dispatcher(with_file_store(&path)).unwrap();
            dispatcher
                .dispatch(panic_at(1, 23.8103, 90.4125))
                .await
                .unwrap();
        }

        let mut reopened = create_dispatcher(with_file_store(&path)).unwrap();
        let events = reopened.events(Some(1)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, EventStatus::Active);

        assert_eq!(reopened.list_unread(2).await.unwrap().len(), 1);
        drop(reopened);

        // Mark-read was committed too
        let mut again = create_dispatcher(with_file_store(&path)).unwrap();
        assert!(again.list_unread(2).await.unwrap().is_empty());
    }

    /// A commit that cannot reach disk is rolled back in memory as well
    #[tokio::test]
    async fn test_e2e_file_commit_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.json");

        let mut dispatcher = create_dispatcher(with_file_store(&path)).unwrap();
        dispatcher
            .dispatch(panic_at(1, 23.8103, 90.4125))
            .await
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // The rename onto a directory fails
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = dispatcher
            .dispatch(panic_at(1, 23.8103, 90.4125))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(dispatcher.events(None).await.unwrap().len(), 1);
        assert_eq!(dispatcher.snapshot().rollback_count, 1);
        assert!(!dir.path().join("alerts.json.tmp").exists());

        std::fs::remove_dir(&path).unwrap();
        std::fs::write(&path, &before).unwrap();
        let reopened = create_dispatcher(with_file_store(&path)).unwrap();
        assert_eq!(reopened.events(None).await.unwrap().len(), 1);
    }

    /// Callers sharing one dispatcher each get their own event
    #[tokio::test]
    async fn test_e2e_shared_dispatcher() {
        let dispatcher = Arc::new(Mutex::new(create_dispatcher(load()).unwrap()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .lock()
                    .await
                    .dispatch(panic_at(1, 23.8103, 90.4125))
                    .await
                    .unwrap()
                    .event_id
            }));
        }

        let mut ids = BTreeSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 8);

        let mut dispatcher = dispatcher.lock().await;
        assert_eq!(dispatcher.list_unread(2).await.unwrap().len(), 8);
        assert_eq!(dispatcher.snapshot().notified_count, 8);
    }

    /// Manual notifications and resolution through the same transactional path
    #[tokio::test]
    async fn test_e2e_admin_flow() {
        let mut dispatcher = create_dispatcher(load()).unwrap();
        let report = dispatcher
            .dispatch(panic_at(1, 23.8103, 90.4125))
            .await
            .unwrap();

        dispatcher
            .notify_manual(report.event_id, 1, 3, "I'm safe now")
            .await
            .unwrap();
        let resolved = dispatcher.resolve_event(report.event_id).await.unwrap();
        assert_eq!(resolved.status, EventStatus::Resolved);

        let inbox = dispatcher.list_unread(3).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "I'm safe now");
    }
}
