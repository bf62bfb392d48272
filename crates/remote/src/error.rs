//! Remote store error kinds

use thiserror::Error;

/// Failures surfaced by a remote store.
///
/// `Unavailable` (listing) aborts only the pruning phase of a run;
/// `Delete` failures are collected per record and never abort anything;
/// `Upload` failures are fatal to the run. The executors never retry -
/// retry policy, if any, belongs to whatever wraps the orchestrator.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote listing call itself failed.
    #[error("remote listing failed: {0}")]
    Unavailable(String),

    /// An upload was rejected or the transfer tool failed.
    #[error("upload failed: {0}")]
    Upload(String),

    /// A single deletion failed; non-fatal, reported per record.
    #[error("delete failed: {0}")]
    Delete(String),
}
