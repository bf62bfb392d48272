//! Remote store trait

use crate::error::RemoteError;
use async_trait::async_trait;
use std::path::Path;

/// The three remote operations the core depends on.
///
/// Implementations are blocking collaborators (an external process or a
/// network endpoint) with no internally imposed timeout; deadlines are
/// the caller's concern.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload a local artifact under the given remote name.
    async fn upload(&self, local: &Path, remote_name: &str) -> Result<(), RemoteError>;

    /// List every artifact name in the remote path.
    async fn list(&self) -> Result<Vec<String>, RemoteError>;

    /// Delete one artifact by name.
    async fn delete(&self, remote_name: &str) -> Result<(), RemoteError>;
}
