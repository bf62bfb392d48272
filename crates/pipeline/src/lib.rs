//! Backup pipeline: external collaborators and the run orchestrator
//!
//! This crate provides:
//! - Database dump collaborators (pg_dump, sqlite file copy)
//! - Archive collaborator (zip)
//! - The orchestrator state machine sequencing
//!   dump -> archive -> upload -> list -> classify -> prune

pub mod archive;
pub mod dump;
pub mod orchestrator;

// Re-exports
pub use archive::{Archiver, ZipArchiver};
pub use dump::{DatabaseSpec, Dumper, PostgresConnection, ToolDumper};
pub use orchestrator::{Orchestrator, PruneOutcome, RunError, RunOptions, RunReport, Stage};
