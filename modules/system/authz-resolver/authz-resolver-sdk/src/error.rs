//! Error types for the `AuthZ` resolver module.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when calling the enforcer.
///
/// These represent infrastructure failures only. A denial is expressed as
/// `Ok(false)` from [`crate::AuthZResolverClient::enforce`], not as an error.
#[derive(Debug, Error)]
pub enum AuthZResolverError {
    /// The policy engine is not reachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The policy engine did not answer before the deadline.
    #[error("enforcer timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
