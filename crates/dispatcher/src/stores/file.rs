//! FileAlertStore - persists committed tables as a JSON document

use contracts::{
    AlertStore, ContractError, DistressEvent, EventId, EventRecord, EventStatus,
    NewNotification, NotificationId, NotificationRecord, StoreConfig, UserId,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use super::state::{AlertTables, SnapshotTx};

/// Configuration for FileAlertStore
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Document path
    pub path: PathBuf,
}

impl FileStoreConfig {
    /// Create config from the store section
    pub fn from_store_config(config: &StoreConfig) -> Self {
        let path = config
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("./safe-route-alerts.json"));

        Self { path }
    }
}

/// Store that rewrites a JSON document on every commit
///
/// The document is written to a sibling temp file and renamed over the
/// previous one, so a failed commit leaves the old document intact.
#[derive(Debug)]
pub struct FileAlertStore {
    name: String,
    config: FileStoreConfig,
    tx: SnapshotTx,
}

impl FileAlertStore {
    /// Open (or create) the document at `config.path`
    pub fn open(name: impl Into<String>, config: FileStoreConfig) -> Result<Self, ContractError> {
        let name = name.into();
        let tables = Self::load(&config.path)?;

        info!(
            store = %name,
            path = %config.path.display(),
            events = tables.events.len(),
            notifications = tables.notifications.len(),
            "FileAlertStore opened"
        );

        Ok(Self {
            name,
            config,
            tx: SnapshotTx::new(tables),
        })
    }

    /// Create from the store section (for factory)
    pub fn from_store_config(
        name: impl Into<String>,
        config: &StoreConfig,
    ) -> Result<Self, ContractError> {
        Self::open(name, FileStoreConfig::from_store_config(config))
    }

    /// Document path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn load(path: &Path) -> Result<AlertTables, ContractError> {
        if !path.exists() {
            return Ok(AlertTables::default());
        }
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(|e| {
            ContractError::persistence(
                path.display().to_string(),
                format!("corrupt alert document: {e}"),
            )
        })
    }

    fn write_document(path: &Path, tables: &AlertTables) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = Self::tmp_path(path);
        let result = Self::write_temp(&tmp_path, tables).and_then(|()| fs::rename(&tmp_path, path));
        if result.is_err() {
            match fs::remove_file(&tmp_path) {
                Ok(()) => debug!(path = %tmp_path.display(), "Removed stale temp document"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %tmp_path.display(), error = %e, "Failed to remove temp document"),
            }
        }
        result
    }

    fn write_temp(tmp_path: &Path, tables: &AlertTables) -> std::io::Result<()> {
        let mut file = File::create(tmp_path)?;
        serde_json::to_writer_pretty(&mut file, tables)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        file.flush()?;
        file.sync_all()
    }

    fn tmp_path(path: &Path) -> PathBuf {
        path.with_extension("json.tmp")
    }

    fn persist(&mut self) -> Result<(), ContractError> {
        let name = &self.name;
        let path = &self.config.path;
        self.tx.commit_with(name, |tables| {
            Self::write_document(path, tables).map_err(|e| {
                error!(store = %name, path = %path.display(), error = %e, "Commit write failed");
                ContractError::persistence(name.as_str(), e.to_string())
            })
        })
    }
}

impl AlertStore for FileAlertStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "file_store_begin", skip(self), fields(store = %self.name))]
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
        Ok(self.tx.current().unread_for(user_id))
    }

    async fn mark_read(&mut self, ids: &[NotificationId]) -> Result<(), ContractError> {
        self.tx.staged(&self.name)?.mark_read(ids);
        Ok(())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, ContractError> {
        Ok(self.tx.current().find_event(event_id).cloned())
    }

    async fn events(&self, user_id: Option<UserId>) -> Result<Vec<EventRecord>, ContractError> {
        Ok(self.tx.current().events(user_id))
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

    #[instrument(
        name = "file_store_commit",
        skip(self),
        fields(store = %self.name, path = %self.config.path.display())
    )]
    async fn commit(&mut self) -> Result<(), ContractError> {
        self.persist()
    }

    #[instrument(name = "file_store_rollback", skip(self), fields(store = %self.name))]
    async fn rollback(&mut self) -> Result<(), ContractError> {
        self.tx.rollback();
        debug!(store = %self.name, "Transaction rolled back");
        Ok(())
    }
}
