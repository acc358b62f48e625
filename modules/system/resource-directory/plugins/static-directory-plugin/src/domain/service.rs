//! Service implementation for the static resource directory plugin.

use std::collections::{HashMap, HashSet};

use coffer_security::ResourceScope;
use uuid::Uuid;

use crate::config::StaticDirectoryConfig;

/// Rejected directory configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryConfigError {
    #[error("duplicate {scope} id {id}")]
    Duplicate { scope: ResourceScope, id: Uuid },

    #[error("{scope} {id} references unknown parent {parent_id}")]
    DanglingParent {
        scope: ResourceScope,
        id: Uuid,
        parent_id: Uuid,
    },
}

/// Static resource directory.
///
/// Holds child → parent maps for secret groups and environments. Every
/// parent reference is checked when the service is built, so lookups only
/// miss for identifiers that were never configured.
#[derive(Debug, Clone, Default)]
pub struct Service {
    secret_groups: HashMap<Uuid, Uuid>,
    environments: HashMap<Uuid, Uuid>,
}

impl Service {
    /// Build the tree from plugin configuration.
    ///
    /// # Errors
    /// Returns [`DirectoryConfigError`] on duplicate identifiers or on a
    /// parent reference that is not declared.
    pub fn from_config(cfg: &StaticDirectoryConfig) -> Result<Self, DirectoryConfigError> {
        let mut organizations = HashSet::new();
        for id in &cfg.organizations {
            if !organizations.insert(*id) {
                return Err(DirectoryConfigError::Duplicate {
                    scope: ResourceScope::Organization,
                    id: *id,
                });
            }
        }

        let mut secret_groups = HashMap::new();
        for sg in &cfg.secret_groups {
            if !organizations.contains(&sg.organization_id) {
                return Err(DirectoryConfigError::DanglingParent {
                    scope: ResourceScope::SecretGroup,
                    id: sg.id,
                    parent_id: sg.organization_id,
                });
            }
            if secret_groups.insert(sg.id, sg.organization_id).is_some() {
                return Err(DirectoryConfigError::Duplicate {
                    scope: ResourceScope::SecretGroup,
                    id: sg.id,
                });
            }
        }

        let mut environments = HashMap::new();
        for env in &cfg.environments {
            if !secret_groups.contains_key(&env.secret_group_id) {
                return Err(DirectoryConfigError::DanglingParent {
                    scope: ResourceScope::Environment,
                    id: env.id,
                    parent_id: env.secret_group_id,
                });
            }
            if environments.insert(env.id, env.secret_group_id).is_some() {
                return Err(DirectoryConfigError::Duplicate {
                    scope: ResourceScope::Environment,
                    id: env.id,
                });
            }
        }

        Ok(Self {
            secret_groups,
            environments,
        })
    }

    /// Direct parent of `id` at `scope`.
    #[must_use]
    pub fn parent_of(&self, scope: ResourceScope, id: Uuid) -> Option<Uuid> {
        match scope {
            ResourceScope::Organization => None,
            ResourceScope::SecretGroup => self.secret_groups.get(&id).copied(),
            ResourceScope::Environment => self.environments.get(&id).copied(),
        }
    }
}
