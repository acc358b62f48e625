//! Tenancy hierarchy levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A level in the Organization → Secret group → Environment hierarchy.
///
/// Strictly nested: an environment belongs to exactly one secret group, a
/// secret group belongs to exactly one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceScope {
    Organization,
    SecretGroup,
    Environment,
}

impl ResourceScope {
    /// Wire name used in authorization queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::SecretGroup => "secret_group",
            Self::Environment => "environment",
        }
    }

    /// The enclosing level, `None` for organizations.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Organization => None,
            Self::SecretGroup => Some(Self::Organization),
            Self::Environment => Some(Self::SecretGroup),
        }
    }

    /// Nesting depth, 0 for organizations.
    #[must_use]
    pub const fn depth(self) -> usize {
        match self {
            Self::Organization => 0,
            Self::SecretGroup => 1,
            Self::Environment => 2,
        }
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
