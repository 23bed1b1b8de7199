//! Commit-or-rollback around a staged unit of work

use contracts::{AlertStore, ContractError};
use tracing::{error, warn};

use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;

/// Open a transaction on `store`
pub(crate) async fn begin<S: AlertStore>(store: &mut S) -> Result<(), DispatcherError> {
    let name = store.name().to_string();
    store
        .begin()
        .await
        .map_err(|e| DispatcherError::from_store(&name, e))
}

/// Commit when `staged` succeeded, otherwise roll back.
///
/// A failed commit is rolled back too; the caller sees one error and no
/// partial writes.
pub(crate) async fn finish<S: AlertStore, T>(
    store: &mut S,
    metrics: &DispatchMetrics,
    staged: Result<T, ContractError>,
) -> Result<T, DispatcherError> {
    let name = store.name().to_string();

    let err = match staged {
        Ok(value) => match store.commit().await {
            Ok(()) => return Ok(value),
            Err(e) => {
                error!(store = %name, error = %e, "Commit failed");
                e
            }
        },
        Err(e) => {
            warn!(store = %name, error = %e, "Staging failed");
            e
        }
    };

    metrics.inc_rollback_count();
    if let Err(rollback_err) = store.rollback().await {
        error!(store = %name, error = %rollback_err, "Rollback failed");
    }
    Err(DispatcherError::from_store(&name, err))
}
