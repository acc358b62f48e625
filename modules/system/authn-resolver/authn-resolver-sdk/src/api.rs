//! Public API trait for the `AuthN` resolver.
//!
//! This trait defines the interface that consumers use to authenticate
//! bearer tokens.

use async_trait::async_trait;

use crate::error::AuthNResolverError;
use crate::models::AuthenticationResult;

/// Public API trait for the `AuthN` resolver.
///
/// Implemented by authentication plugins and consumed by the API gateway:
///
/// ```ignore
/// let result = authn.authenticate(token).await?;
/// let principal = result.principal;
/// ```
///
/// # Security
///
/// The returned `Principal` includes the original bearer token
/// in the `bearer_token` field (redacted in `Debug`).
#[async_trait]
pub trait AuthNResolverClient: Send + Sync {
    /// Authenticate a bearer token and return the validated identity.
    ///
    /// # Arguments
    ///
    /// * `bearer_token` - The raw bearer token string (without "Bearer " prefix)
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the signature does not match or the token is malformed
    /// - `ExpiredToken` if the token is past its expiry
    /// - `ServiceUnavailable` if the resolver cannot serve requests right now
    /// - `Internal` for unexpected errors
    async fn authenticate(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError>;
}
