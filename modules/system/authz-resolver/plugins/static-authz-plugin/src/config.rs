//! Configuration for the static `AuthZ` resolver plugin.

use coffer_security::ResourceScope;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthZPluginConfig {
    /// Authorization mode.
    pub mode: AuthZMode,

    /// Grant table consulted in `static_grants` mode.
    pub grants: Vec<Grant>,
}

/// Authorization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthZMode {
    /// Allow every query.
    #[default]
    AllowAll,
    /// Deny every query.
    DenyAll,
    /// Allow only queries covered by `grants`.
    StaticGrants,
}

/// A set of actions held by one subject on one resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    pub subject_id: Uuid,
    pub resource_type: ResourceScope,
    pub resource_id: Uuid,
    pub actions: Vec<String>,
}
