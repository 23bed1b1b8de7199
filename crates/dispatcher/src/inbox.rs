//! Inbox - unread notifications for a user, consumed on read

use contracts::{
    AlertStore, ContactDirectory, ContractError, InboxEntry, NotificationId, NotificationRecord,
    UserId,
};
use tracing::{debug, instrument};

use crate::dispatcher::ProximityDispatcher;
use crate::error::DispatcherError;
use crate::transaction;

impl<D, S> ProximityDispatcher<D, S>
where
    D: ContactDirectory,
    S: AlertStore,
{
    /// Unread notifications for `user_id`, newest first, marked read in the
    /// same transaction.
    ///
    /// A second call returns only what arrived in between.
    #[instrument(name = "dispatcher_list_unread", skip(self), fields(store = %self.store.name()))]
    pub async fn list_unread(&mut self, user_id: UserId) -> Result<Vec<InboxEntry>, DispatcherError> {
        if self.directory.find_user(user_id).await?.is_none() {
            return Err(DispatcherError::user_not_found(user_id));
        }

        transaction::begin(&mut self.store).await?;
        let staged = take_unread(&mut self.store, user_id).await;
        let records = transaction::finish(&mut self.store, &self.metrics, staged).await?;

        self.metrics.add_inbox_reads(records.len());
        debug!(user_id, count = records.len(), "Inbox read");
        Ok(records.iter().map(InboxEntry::from).collect())
    }
}

async fn take_unread<S: AlertStore>(
    store: &mut S,
    user_id: UserId,
) -> Result<Vec<NotificationRecord>, ContractError> {
    let mut records = store.unread_for(user_id).await?;
    sort_newest_first(&mut records);

    let ids: Vec<NotificationId> = records.iter().map(|r| r.id).collect();
    if !ids.is_empty() {
        store.mark_read(&ids).await?;
    }
    Ok(records)
}

/// `created_at` descending, ties broken by id descending
fn sort_newest_first(records: &mut [NotificationRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
