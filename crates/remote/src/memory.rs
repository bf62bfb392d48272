//! In-memory remote store for tests

use crate::error::RemoteError;
use crate::store::RemoteStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Remote store backed by a set of names.
///
/// Supports scripted failures so partial-failure paths can be
/// exercised without a network or an rclone install.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    names: Mutex<BTreeSet<String>>,
    fail_deletes: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
    fail_uploads: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the remote with artifact names.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let remote = Self::new();
        remote
            .names
            .lock()
            .extend(names.into_iter().map(Into::into));
        remote
    }

    /// Make future `delete` calls for `name` fail.
    pub fn fail_delete_of(&self, name: impl Into<String>) {
        self.fail_deletes.lock().insert(name.into());
    }

    /// Make future `list` calls fail.
    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Make future `upload` calls fail.
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    /// Current artifact names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.names.lock().iter().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.lock().contains(name)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn upload(&self, _local: &Path, remote_name: &str) -> Result<(), RemoteError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(RemoteError::Upload("scripted upload failure".to_string()));
        }
        self.names.lock().insert(remote_name.to_string());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, RemoteError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(
                "scripted listing failure".to_string(),
            ));
        }
        Ok(self.names())
    }

    async fn delete(&self, remote_name: &str) -> Result<(), RemoteError> {
        if self.fail_deletes.lock().contains(remote_name) {
            return Err(RemoteError::Delete(format!(
                "scripted delete failure for '{remote_name}'"
            )));
        }
        self.names.lock().remove(remote_name);
        Ok(())
    }
}
