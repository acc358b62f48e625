//! Public API trait for the `AuthZ` resolver.

use async_trait::async_trait;

use crate::error::AuthZResolverError;
use crate::models::AuthorizationQuery;

/// Enforcer contract.
///
/// Answers one question: does the subject hold the action on the resource.
/// Injected into the gateway as `Arc<dyn AuthZResolverClient>`:
///
/// ```ignore
/// let allowed = authz.enforce(&query).await?;
/// ```
///
/// The answer is authoritative. Callers never cache it and never retry.
#[async_trait]
pub trait AuthZResolverClient: Send + Sync {
    /// Evaluate a single authorization query.
    ///
    /// Returns `Ok(false)` for an ordinary policy denial.
    ///
    /// # Errors
    ///
    /// - `ServiceUnavailable` if the policy engine cannot be reached
    /// - `Internal` for unexpected errors
    async fn enforce(&self, query: &AuthorizationQuery) -> Result<bool, AuthZResolverError>;
}
