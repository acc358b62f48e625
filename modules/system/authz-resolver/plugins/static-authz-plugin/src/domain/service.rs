//! Service implementation for the static `AuthZ` resolver plugin.

use std::collections::{HashMap, HashSet};

use authz_resolver_sdk::AuthorizationQuery;
use coffer_security::ResourceScope;
use uuid::Uuid;

use crate::config::{AuthZMode, StaticAuthZPluginConfig};

type GrantKey = (Uuid, ResourceScope, Uuid);

/// Static `AuthZ` resolver service.
#[derive(Debug, Clone, Default)]
pub struct Service {
    mode: AuthZMode,
    grants: HashMap<GrantKey, HashSet<String>>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticAuthZPluginConfig) -> Self {
        let mut grants: HashMap<GrantKey, HashSet<String>> = HashMap::new();
        for grant in &cfg.grants {
            grants
                .entry((grant.subject_id, grant.resource_type, grant.resource_id))
                .or_default()
                .extend(grant.actions.iter().cloned());
        }

        Self {
            mode: cfg.mode,
            grants,
        }
    }

    /// Evaluate a query against the configured mode.
    #[must_use]
    pub fn evaluate(&self, query: &AuthorizationQuery) -> bool {
        let allowed = match self.mode {
            AuthZMode::AllowAll => true,
            AuthZMode::DenyAll => false,
            AuthZMode::StaticGrants => self
                .grants
                .get(&(query.subject_id, query.resource_type, query.resource_id))
                .is_some_and(|held| {
                    held.contains(query.action.as_str()) || held.contains(query.action.base())
                }),
        };

        tracing::debug!(
            subject_id = %query.subject_id,
            resource_type = %query.resource_type,
            resource_id = %query.resource_id,
            action = %query.action,
            allowed,
            "static authz evaluation"
        );
        allowed
    }
}
