//! Client implementation for the static `AuthZ` resolver plugin.

use async_trait::async_trait;
use authz_resolver_sdk::{AuthZResolverClient, AuthZResolverError, AuthorizationQuery};

use super::service::Service;

#[async_trait]
impl AuthZResolverClient for Service {
    async fn enforce(&self, query: &AuthorizationQuery) -> Result<bool, AuthZResolverError> {
        Ok(self.evaluate(query))
    }
}
