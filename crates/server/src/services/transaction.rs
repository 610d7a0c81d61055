//! Snapshot, mutate, persist, restore.

use crate::db::PersistenceGateway;
use crate::models::UserAccount;

use super::ServiceError;

/// Apply `mutate` to `account` and persist the result.
///
/// A snapshot of the account is taken first. If `mutate` returns an error,
/// or the store rejects the save, the account is restored to the snapshot
/// before the error is returned, so the in-memory state never diverges from
/// what was last persisted.
///
/// The caller must hold the session's account lock for the whole call.
///
/// # Errors
///
/// Returns the mutation's own error, or `ServiceError::Persistence` if the
/// save failed.
pub async fn persist_or_revert<T, F>(
    gateway: &dyn PersistenceGateway,
    account: &mut UserAccount,
    mutate: F,
) -> Result<T, ServiceError>
where
    T: Send,
    F: FnOnce(&mut UserAccount) -> Result<T, ServiceError> + Send,
{
    let snapshot = account.clone();

    let value = match mutate(account) {
        Ok(value) => value,
        Err(e) => {
            *account = snapshot;
            return Err(e);
        }
    };

    if let Err(e) = gateway.save_account(account).await {
        tracing::warn!(
            username = %account.username,
            error = %e,
            "Save failed, restoring previous account state"
        );
        *account = snapshot;
        return Err(ServiceError::Persistence(e));
    }

    Ok(value)
}
