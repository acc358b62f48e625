//! Domain models for the `AuthZ` resolver module.

use std::fmt;

use coffer_security::{Principal, ResourceScope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base capability names understood by the enforcer.
pub mod actions {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const DELETE: &str = "delete";
    pub const ADMIN: &str = "admin";
    pub const GRANT: &str = "grant";
    pub const REVOKE: &str = "revoke";
}

/// The capability required by a request.
///
/// A bare base name (`read`) or a base name followed by `:key=value`
/// qualifiers (`grant:role=admin:target=user`). The enforcer applies role
/// hierarchy rules to qualified actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action {
    pub name: String,
}

impl Action {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Append a `:key=value` qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, key: &str, value: &str) -> Self {
        self.name.push(':');
        self.name.push_str(key);
        self.name.push('=');
        self.name.push_str(value);
        self
    }

    /// The base capability, without qualifiers.
    #[must_use]
    pub fn base(&self) -> &str {
        self.name.split(':').next().unwrap_or_default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The exact tuple sent to the enforcer.
///
/// Built fresh for every request and never cached: policy can change between
/// any two requests from the same subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationQuery {
    pub subject_id: Uuid,
    pub resource_type: ResourceScope,
    pub resource_id: Uuid,
    pub action: Action,
}

impl AuthorizationQuery {
    /// Query for the calling principal.
    #[must_use]
    pub fn new(
        principal: &Principal,
        resource_type: ResourceScope,
        resource_id: Uuid,
        action: impl Into<Action>,
    ) -> Self {
        Self {
            subject_id: principal.subject_id(),
            resource_type,
            resource_id,
            action: action.into(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn qualifiers_are_appended_in_order() {
        let action = Action::new(actions::GRANT)
            .with_qualifier("role", "admin")
            .with_qualifier("target", "group");

        assert_eq!(action.as_str(), "grant:role=admin:target=group");
        assert_eq!(action.base(), "grant");
        assert_eq!(action.to_string(), "grant:role=admin:target=group");
    }

    #[test]
    fn base_of_plain_action_is_itself() {
        assert_eq!(Action::from("read").base(), "read");
    }

    #[test]
    fn query_is_built_for_the_principal() {
        let subject = Uuid::from_u128(0x2222);
        let resource = Uuid::from_u128(0x3333);
        let principal = Principal::builder().subject_id(subject).build();

        let query =
            AuthorizationQuery::new(&principal, ResourceScope::Environment, resource, actions::READ);

        assert_eq!(query.subject_id, subject);
        assert_eq!(query.resource_type, ResourceScope::Environment);
        assert_eq!(query.resource_id, resource);
        assert_eq!(query.action.as_str(), "read");
    }

    #[test]
    fn query_serializes_with_wire_names() {
        let query = AuthorizationQuery {
            subject_id: Uuid::nil(),
            resource_type: ResourceScope::SecretGroup,
            resource_id: Uuid::nil(),
            action: Action::new(actions::WRITE),
        };

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["resource_type"], "secret_group");
        assert_eq!(json["action"], "write");
    }
}
