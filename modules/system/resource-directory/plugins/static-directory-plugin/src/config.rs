//! Configuration for the static resource directory plugin.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticDirectoryConfig {
    pub organizations: Vec<Uuid>,
    pub secret_groups: Vec<SecretGroupEntry>,
    pub environments: Vec<EnvironmentEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecretGroupEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentEntry {
    pub id: Uuid,
    pub secret_group_id: Uuid,
}
