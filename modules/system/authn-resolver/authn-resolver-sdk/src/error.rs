//! Error types for the `AuthN` resolver module.

use thiserror::Error;

/// Errors that can occur when using the `AuthN` resolver API.
#[derive(Debug, Error)]
pub enum AuthNResolverError {
    /// The token signature is wrong or the token cannot be parsed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token was valid once but is past its expiry.
    #[error("token expired")]
    ExpiredToken,

    /// The resolver is not available yet.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
