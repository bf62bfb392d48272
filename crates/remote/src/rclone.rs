//! rclone-backed remote store
//!
//! Shells out to `rclone` for every operation, mirroring how the tool
//! is driven by hand: `rclone copyto` to upload, `rclone lsf` to list,
//! `rclone delete` to remove a single artifact.

use crate::error::RemoteError;
use crate::store::RemoteStore;
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Remote store driven through the `rclone` CLI.
#[derive(Debug, Clone)]
pub struct RcloneRemote {
    /// rclone remote spec, e.g. `b2:bucket/backups`
    remote: String,
}

impl RcloneRemote {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
        }
    }

    /// Full remote path for one artifact name.
    fn remote_path(&self, name: &str) -> String {
        format!("{}/{}", self.remote.trim_end_matches('/'), name)
    }

    async fn run(&self, args: &[&str]) -> Result<Output, std::io::Error> {
        debug!(?args, "invoking rclone");
        Command::new("rclone").args(args).output().await
    }
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("rclone exited with {}", output.status)
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl RemoteStore for RcloneRemote {
    async fn upload(&self, local: &Path, remote_name: &str) -> Result<(), RemoteError> {
        let local = local.to_string_lossy().into_owned();
        let dest = self.remote_path(remote_name);
        let output = self
            .run(&["copyto", &local, &dest])
            .await
            .map_err(|e| RemoteError::Upload(format!("failed to spawn rclone: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RemoteError::Upload(stderr_of(&output)))
        }
    }

    async fn list(&self) -> Result<Vec<String>, RemoteError> {
        let output = self
            .run(&["lsf", &self.remote])
            .await
            .map_err(|e| RemoteError::Unavailable(format!("failed to spawn rclone: {e}")))?;

        if !output.status.success() {
            return Err(RemoteError::Unavailable(stderr_of(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn delete(&self, remote_name: &str) -> Result<(), RemoteError> {
        let dest = self.remote_path(remote_name);
        let output = self
            .run(&["delete", &dest])
            .await
            .map_err(|e| RemoteError::Delete(format!("failed to spawn rclone: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RemoteError::Delete(stderr_of(&output)))
        }
    }
}
