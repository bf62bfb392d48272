//! Inventory lister: remote names -> ordered backup set

use crate::error::RemoteError;
use crate::store::RemoteStore;
use retention::{BackupSet, NamingScheme};
use tracing::debug;

/// List the remote and decode every name into a backup record.
///
/// Names that do not match the scheme are silently dropped (foreign
/// files sharing the remote path). A failed listing call propagates as
/// `RemoteError::Unavailable`; no retries happen here.
pub async fn list_backups(
    remote: &dyn RemoteStore,
    scheme: &NamingScheme,
) -> Result<BackupSet, RemoteError> {
    let names = remote.list().await?;

    let mut records = Vec::with_capacity(names.len());
    for name in names {
        match scheme.decode(&name) {
            Some(record) => records.push(record),
            None => debug!(%name, "ignoring foreign file in remote path"),
        }
    }

    Ok(BackupSet::from_records(records))
}
