//! Remote storage seam
//!
//! This crate provides:
//! - The `RemoteStore` trait (upload / list / delete)
//! - An rclone-backed implementation (production)
//! - An in-memory implementation (tests)
//! - The inventory lister (remote names -> ordered backup set)
//! - The pruning executor (batched deletes with per-record outcomes)

pub mod error;
pub mod inventory;
pub mod memory;
pub mod prune;
pub mod rclone;
pub mod store;

// Re-exports
pub use error::RemoteError;
pub use inventory::list_backups;
pub use memory::MemoryRemote;
pub use prune::{prune, PruneReport};
pub use rclone::RcloneRemote;
pub use store::RemoteStore;
