//! Backup naming and retention core
//!
//! This crate provides:
//! - Backup artifact naming codec (prefix + timestamp)
//! - Backup records and timestamp-ordered backup sets
//! - Retention policy configuration
//! - Grandfather-father-son classification (keep/delete partition)
//!
//! Everything here is pure: no I/O, no clocks, no process spawning.

pub mod classify;
pub mod naming;
pub mod policy;
pub mod record;

// Re-exports
pub use classify::{classify, ClassificationResult, Tier};
pub use naming::NamingScheme;
pub use policy::RetentionPolicy;
pub use record::{BackupRecord, BackupSet};
