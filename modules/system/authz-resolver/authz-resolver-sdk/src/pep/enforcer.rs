//! Policy Enforcement Point (`PEP`) object.
//!
//! [`PolicyEnforcer`] encapsulates the enforcer round trip:
//! call enforcer (bounded by a deadline) → allow or deny.
//!
//! Constructed once during gateway wiring with the `AuthZ` client. Holds no
//! per-request state and never caches answers.

use std::sync::Arc;
use std::time::Duration;

use crate::api::AuthZResolverClient;
use crate::error::AuthZResolverError;
use crate::models::AuthorizationQuery;

/// Deadline applied to a single enforcer call unless overridden.
pub const DEFAULT_ENFORCER_TIMEOUT: Duration = Duration::from_secs(2);

/// Error from the PEP enforcement flow.
#[derive(Debug, thiserror::Error)]
pub enum EnforcerError {
    /// The enforcer answered `false`.
    #[error("access denied by enforcer")]
    Denied,

    /// The enforcer call failed or timed out.
    #[error("authorization evaluation failed: {0}")]
    EvaluationFailed(#[from] AuthZResolverError),
}

/// Policy Enforcement Point.
///
/// Cloneable and cheap to pass around (`Arc` inside).
///
/// # Example
///
/// ```ignore
/// use authz_resolver_sdk::{AuthorizationQuery, actions, pep::PolicyEnforcer};
///
/// let enforcer = PolicyEnforcer::new(authz.clone());
///
/// let query = AuthorizationQuery::new(&principal, ResourceScope::Organization, org_id, actions::READ);
/// match enforcer.check(&query).await {
///     Ok(()) => { /* continue */ }
///     Err(EnforcerError::Denied) => { /* 403 FORBIDDEN */ }
///     Err(EnforcerError::EvaluationFailed(_)) => { /* 403, fail closed */ }
/// }
/// ```
#[derive(Clone)]
pub struct PolicyEnforcer {
    authz: Arc<dyn AuthZResolverClient>,
    timeout: Duration,
}

impl PolicyEnforcer {
    /// Create a new enforcer with [`DEFAULT_ENFORCER_TIMEOUT`].
    #[must_use]
    pub fn new(authz: Arc<dyn AuthZResolverClient>) -> Self {
        Self {
            authz,
            timeout: DEFAULT_ENFORCER_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Call the enforcer exactly once.
    ///
    /// # Errors
    ///
    /// - [`EnforcerError::Denied`] if the enforcer answers `false`
    /// - [`EnforcerError::EvaluationFailed`] if the call fails or exceeds the deadline
    pub async fn check(&self, query: &AuthorizationQuery) -> Result<(), EnforcerError> {
        let allowed = tokio::time::timeout(self.timeout, self.authz.enforce(query))
            .await
            .map_err(|_| AuthZResolverError::Timeout(self.timeout))??;

        tracing::trace!(
            subject_id = %query.subject_id,
            resource_type = %query.resource_type,
            action = %query.action,
            allowed,
            "enforcer answered"
        );
        if allowed {
            Ok(())
        } else {
            Err(EnforcerError::Denied)
        }
    }
}

impl std::fmt::Debug for PolicyEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEnforcer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
