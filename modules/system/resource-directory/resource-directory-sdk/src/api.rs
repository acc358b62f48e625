//! Public API trait for the resource directory.

use async_trait::async_trait;
use coffer_security::ResourceScope;
use uuid::Uuid;

use crate::error::DirectoryError;

/// Parent-chain lookups.
///
/// ```ignore
/// let parent = directory.parent_of(ResourceScope::Environment, env_id).await?;
/// if parent != Some(path_secret_group) {
///     // mismatch
/// }
/// ```
#[async_trait]
pub trait ResourceDirectoryClient: Send + Sync {
    /// Identifier of the resource that directly encloses `id`.
    ///
    /// Returns `Ok(None)` when `id` is not a known resource at `scope`, or
    /// when `scope` is [`ResourceScope::Organization`].
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the backing store cannot be reached
    /// - `Internal` for unexpected errors
    async fn parent_of(&self, scope: ResourceScope, id: Uuid)
    -> Result<Option<Uuid>, DirectoryError>;
}
