//! Archive collaborator
//!
//! Compression is delegated to the `zip` CLI; this seam only cares
//! about "list of paths in, one artifact out".

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Archive collaborator seam.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Pack `sources` (files or directories) into one artifact at `dest`.
    async fn archive(&self, sources: &[PathBuf], dest: &Path) -> Result<()>;
}

/// Production archiver shelling out to `zip -r`.
#[derive(Debug, Default, Clone)]
pub struct ZipArchiver;

#[async_trait]
impl Archiver for ZipArchiver {
    async fn archive(&self, sources: &[PathBuf], dest: &Path) -> Result<()> {
        if sources.is_empty() {
            bail!("nothing to archive");
        }

        debug!(dest = %dest.display(), count = sources.len(), "creating archive");
        let output = Command::new("zip")
            .arg("-rq")
            .arg(dest)
            .args(sources)
            .output()
            .await
            .context("failed to spawn zip")?;

        if !output.status.success() {
            bail!(
                "zip failed for {}: {}",
                dest.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
