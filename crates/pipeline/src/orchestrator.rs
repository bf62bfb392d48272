//! Run orchestrator
//!
//! Sequences one backup run through explicit stages:
//! `Idle -> Dumping -> Archiving -> Uploading -> Listing -> Classifying
//! -> Pruning -> Done`. The stages are strictly sequential; each one
//! consumes the previous stage's side effect.
//!
//! Failure contract:
//! - Dumping / Archiving / Uploading failures abort the run (the new
//!   backup is incomplete or unsafe to trust).
//! - A Listing failure aborts only the pruning phase; the uploaded
//!   backup already counts as a success.
//! - Individual delete failures are collected in the prune report and
//!   never abort anything.

use crate::archive::Archiver;
use crate::dump::{DatabaseSpec, Dumper};
use anyhow::Result;
use chrono::NaiveDateTime;
use remote::{list_backups, PruneReport, RemoteError, RemoteStore};
use retention::{classify, NamingScheme, RetentionPolicy};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Stages of one backup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Dumping,
    Archiving,
    Uploading,
    Listing,
    Classifying,
    Pruning,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Dumping => "dumping",
            Stage::Archiving => "archiving",
            Stage::Uploading => "uploading",
            Stage::Listing => "listing",
            Stage::Classifying => "classifying",
            Stage::Pruning => "pruning",
            Stage::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Terminal failure of a run, naming the stage it died in.
#[derive(Debug, Error)]
#[error("backup failed during the {stage} stage: {cause:#}")]
pub struct RunError {
    pub stage: Stage,
    pub cause: anyhow::Error,
}

fn fail(stage: Stage, cause: impl Into<anyhow::Error>) -> RunError {
    RunError {
        stage,
        cause: cause.into(),
    }
}

/// Per-run switches (CLI flags in the outer shell).
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Touch the remote at all; without it the run is a local rehearsal
    pub live: bool,
    /// Run the pruning phase after a successful upload
    pub prune_enabled: bool,
    /// Skip configured directories that do not exist instead of failing
    pub ignore_missing_dirs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            live: false,
            prune_enabled: true,
            ignore_missing_dirs: false,
        }
    }
}

/// How the pruning phase of a run ended.
#[derive(Debug)]
pub enum PruneOutcome {
    /// The batch ran; the report may still contain per-record failures.
    Completed(PruneReport),
    /// The listing call failed, so nothing was classified or deleted.
    ListingFailed(RemoteError),
    /// The run was not live; no remote mutation happened.
    Skipped,
    /// Pruning was disabled for this run.
    Disabled,
}

/// Result of one successful run.
#[derive(Debug)]
pub struct RunReport {
    /// Remote name of the new artifact
    pub artifact: String,
    pub uploaded: bool,
    pub prune: PruneOutcome,
}

/// Sequences one backup run over the external collaborators.
pub struct Orchestrator {
    dumper: Arc<dyn Dumper>,
    archiver: Arc<dyn Archiver>,
    remote: Arc<dyn RemoteStore>,
    scheme: NamingScheme,
    policy: RetentionPolicy,
    dirs: Vec<PathBuf>,
    databases: Vec<DatabaseSpec>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(
        dumper: Arc<dyn Dumper>,
        archiver: Arc<dyn Archiver>,
        remote: Arc<dyn RemoteStore>,
        scheme: NamingScheme,
        policy: RetentionPolicy,
    ) -> Self {
        Self {
            dumper,
            archiver,
            remote,
            scheme,
            policy,
            dirs: Vec::new(),
            databases: Vec::new(),
            options: RunOptions::default(),
        }
    }

    pub fn with_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.dirs = dirs;
        self
    }

    pub fn with_databases(mut self, databases: Vec<DatabaseSpec>) -> Self {
        self.databases = databases;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one backup cycle stamped with `now`.
    pub async fn run(&self, now: NaiveDateTime) -> Result<RunReport, RunError> {
        info!("starting backup run");
        self.enter(Stage::Idle);

        // Dumping: every database lands in a throwaway staging
        // directory that gets archived alongside the configured dirs.
        self.enter(Stage::Dumping);
        let staging = tempfile::tempdir().map_err(|e| fail(Stage::Dumping, e))?;
        let mut databases: Vec<&DatabaseSpec> = self.databases.iter().collect();
        databases.sort_by_key(|db| db.label());
        for (i, db) in databases.iter().enumerate() {
            info!(db = %db, "dumping database");
            // The index keeps dump names unique when two databases
            // share a label.
            let dest = staging.path().join(format!("{}_{}", db.label(), i));
            self.dumper
                .dump(db, &dest)
                .await
                .map_err(|e| fail(Stage::Dumping, e))?;
        }

        // Archiving
        self.enter(Stage::Archiving);
        let mut sources = vec![staging.path().to_path_buf()];
        sources.extend(self.resolve_dirs().map_err(|e| fail(Stage::Archiving, e))?);
        let artifact_name = self.scheme.encode(now);
        let outdir = tempfile::tempdir().map_err(|e| fail(Stage::Archiving, e))?;
        let artifact_path = outdir.path().join(&artifact_name);
        info!(artifact = %artifact_name, "creating archive");
        self.archiver
            .archive(&sources, &artifact_path)
            .await
            .map_err(|e| fail(Stage::Archiving, e))?;

        // Uploading
        self.enter(Stage::Uploading);
        let uploaded = if self.options.live {
            info!(artifact = %artifact_name, "uploading artifact");
            self.remote
                .upload(&artifact_path, &artifact_name)
                .await
                .map_err(|e| fail(Stage::Uploading, e))?;
            true
        } else {
            info!("skipping upload; run is not live");
            false
        };

        let prune = self.prune_phase().await;

        self.enter(Stage::Done);
        Ok(RunReport {
            artifact: artifact_name,
            uploaded,
            prune,
        })
    }

    /// Listing -> Classifying -> Pruning. Never fails the run.
    async fn prune_phase(&self) -> PruneOutcome {
        if !self.options.prune_enabled {
            info!("pruning disabled for this run");
            return PruneOutcome::Disabled;
        }
        if !self.options.live {
            info!("skipping pruning; run is not live");
            return PruneOutcome::Skipped;
        }

        self.enter(Stage::Listing);
        let set = match list_backups(self.remote.as_ref(), &self.scheme).await {
            Ok(set) => set,
            Err(err) => {
                // The new backup is already uploaded; a failed listing
                // only costs us this cycle's pruning.
                warn!(error = %err, "remote listing failed; skipping pruning this run");
                return PruneOutcome::ListingFailed(err);
            }
        };

        self.enter(Stage::Classifying);
        let result = classify(&set, &self.policy);
        info!(
            total = set.len(),
            keep = result.keep.len(),
            delete = result.delete.len(),
            "classified remote backups"
        );

        self.enter(Stage::Pruning);
        PruneOutcome::Completed(remote::prune(self.remote.as_ref(), result.delete).await)
    }

    /// Check every configured directory exists, honoring
    /// `ignore_missing_dirs`.
    fn resolve_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut resolved = Vec::new();
        for dir in &self.dirs {
            if dir.exists() {
                resolved.push(dir.clone());
            } else if self.options.ignore_missing_dirs {
                warn!(dir = %dir.display(), "skipping missing directory");
            } else {
                anyhow::bail!("directory not found: {}", dir.display());
            }
        }
        Ok(resolved)
    }

    fn enter(&self, stage: Stage) {
        debug!(%stage, "entering stage");
    }
}
