//! Pruning executor: batched deletes with per-record outcomes

use crate::error::RemoteError;
use crate::store::RemoteStore;
use futures::future;
use retention::BackupRecord;
use tracing::{info, warn};

/// Outcome of one pruning batch.
///
/// Every requested deletion gets exactly one outcome; a failed delete
/// never aborts the rest of the batch.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub succeeded: Vec<BackupRecord>,
    pub failed: Vec<(BackupRecord, RemoteError)>,
}

impl PruneReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Human-readable one-liner, e.g. `3 deleted, 1 failed`.
    pub fn summary(&self) -> String {
        format!("{} deleted, {} failed", self.succeeded.len(), self.failed.len())
    }
}

/// Delete every record in the batch, collecting per-record outcomes.
///
/// Deletions run concurrently; the report is assembled from the
/// original batch order so it is complete regardless of which delete
/// finishes first.
pub async fn prune(remote: &dyn RemoteStore, doomed: Vec<BackupRecord>) -> PruneReport {
    if doomed.is_empty() {
        return PruneReport::default();
    }

    info!(count = doomed.len(), "pruning old backups");

    let outcomes =
        future::join_all(doomed.iter().map(|record| remote.delete(&record.raw_name))).await;

    let mut report = PruneReport::default();
    for (record, outcome) in doomed.into_iter().zip(outcomes) {
        match outcome {
            Ok(()) => {
                info!(name = %record.raw_name, "pruned");
                report.succeeded.push(record);
            }
            Err(err) => {
                warn!(name = %record.raw_name, error = %err, "prune failed");
                report.failed.push((record, err));
            }
        }
    }

    report
}
