//! Domain models for the `AuthN` resolver module.

use coffer_security::Principal;

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// The verified principal, with every identity attribute populated from
    /// the token claims and the original bearer token attached.
    pub principal: Principal,
}
