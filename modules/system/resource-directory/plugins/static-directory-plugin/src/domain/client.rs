//! Client implementation for the static resource directory plugin.

use async_trait::async_trait;
use coffer_security::ResourceScope;
use resource_directory_sdk::{DirectoryError, ResourceDirectoryClient};
use uuid::Uuid;

use super::service::Service;

#[async_trait]
impl ResourceDirectoryClient for Service {
    async fn parent_of(
        &self,
        scope: ResourceScope,
        id: Uuid,
    ) -> Result<Option<Uuid>, DirectoryError> {
        Ok(Service::parent_of(self, scope, id))
    }
}
