//! Route classification.
//!
//! Pure functions over `(method, path)`; no I/O and no HTTP runtime needed.
//! The rules are ordered and the first match wins:
//!
//! 1. `POST` on the organization collection is tenant creation.
//! 2. A special marker segment after the structural prefix selects a
//!    special resource kind.
//! 3. Anything else is a domain resource at the deepest identifier present.

use std::fmt;

use authz_resolver_sdk::{Action, actions};
use axum::http::Method;
use coffer_security::ResourceScope;

const ORGANIZATIONS: &str = "organizations";
const SECRET_GROUPS: &str = "secret-groups";
const ENVIRONMENTS: &str = "environments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("unsupported method")]
    UnsupportedMethod,

    #[error("path does not address a resource")]
    NoResource,

    #[error("path contains an empty segment")]
    EmptySegment,
}

/// Nested routes that do not follow the generic scope pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    Membership,
    PermissionGrant,
    PermissionRevoke,
    SecretAccess,
    ProviderConfig,
}

impl SpecialKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::PermissionGrant => "permission_grant",
            Self::PermissionRevoke => "permission_revoke",
            Self::SecretAccess => "secret_access",
            Self::ProviderConfig => "provider_config",
        }
    }

    /// Kinds whose request body names the role being assigned.
    #[must_use]
    pub const fn reads_role_payload(self) -> bool {
        matches!(
            self,
            Self::Membership | Self::PermissionGrant | Self::PermissionRevoke
        )
    }

    /// Kinds whose path identifiers must form one parent chain.
    #[must_use]
    pub const fn requires_hierarchy_check(self) -> bool {
        matches!(self, Self::SecretAccess | Self::ProviderConfig)
    }
}

impl fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteClassification {
    TenantCreation,
    SpecialResource {
        kind: SpecialKind,
        scope: ResourceScope,
        action: Action,
    },
    DomainResource {
        scope: ResourceScope,
        action: Action,
    },
}

impl RouteClassification {
    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TenantCreation => "tenant_creation",
            Self::SpecialResource { .. } => "special_resource",
            Self::DomainResource { .. } => "domain_resource",
        }
    }

    #[must_use]
    pub const fn scope(&self) -> Option<ResourceScope> {
        match self {
            Self::TenantCreation => None,
            Self::SpecialResource { scope, .. } | Self::DomainResource { scope, .. } => {
                Some(*scope)
            }
        }
    }

    #[must_use]
    pub const fn action(&self) -> Option<&Action> {
        match self {
            Self::TenantCreation => None,
            Self::SpecialResource { action, .. } | Self::DomainResource { action, .. } => {
                Some(action)
            }
        }
    }
}

impl fmt::Display for RouteClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TenantCreation => f.write_str("tenant_creation"),
            Self::SpecialResource {
                kind,
                scope,
                action,
            } => write!(f, "special_resource({kind}, {scope}, {action})"),
            Self::DomainResource { scope, action } => {
                write!(f, "domain_resource({scope}, {action})")
            }
        }
    }
}

/// Strip the version prefix and trailing slashes.
///
/// Returns a path starting with `/` (`/` itself for the prefix root).
///
/// # Errors
/// - [`ClassifyError::NoResource`] if `path` is outside `prefix`
/// - [`ClassifyError::EmptySegment`] if the path contains `//`
pub fn normalize(path: &str, prefix: &str) -> Result<String, ClassifyError> {
    let prefix = prefix.trim_end_matches('/');
    let rest = path
        .strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or(ClassifyError::NoResource)?;

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Ok("/".to_owned());
    }
    if rest.split('/').skip(1).any(str::is_empty) {
        return Err(ClassifyError::EmptySegment);
    }
    Ok(rest.to_owned())
}

/// Identifiers found in the structural prefix
/// `organizations/{org}/secret-groups/{sg}/environments/{env}`.
///
/// Values are raw path segments; resolvers validate them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePath {
    pub organization: Option<String>,
    pub secret_group: Option<String>,
    pub environment: Option<String>,
    in_tree: bool,
    rest: Vec<String>,
}

impl ResourcePath {
    /// Parse a normalized path.
    #[must_use]
    pub fn parse(normalized: &str) -> Self {
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let mut path = Self::default();

        let Some((&first, mut rest)) = segments.split_first() else {
            return path;
        };
        if first != ORGANIZATIONS {
            return path;
        }
        path.in_tree = true;

        if let [org, tail @ ..] = rest {
            path.organization = Some((*org).to_owned());
            rest = tail;

            if let [marker, tail @ ..] = rest
                && *marker == SECRET_GROUPS
            {
                rest = tail;
                if let [sg, tail @ ..] = rest {
                    path.secret_group = Some((*sg).to_owned());
                    rest = tail;

                    if let [marker, tail @ ..] = rest
                        && *marker == ENVIRONMENTS
                    {
                        rest = tail;
                        if let [env, tail @ ..] = rest {
                            path.environment = Some((*env).to_owned());
                            rest = tail;
                        }
                    }
                }
            }
        }

        path.rest = rest.iter().map(|s| (*s).to_owned()).collect();
        path
    }

    /// `/organizations` itself, with no identifier.
    #[must_use]
    pub fn is_organization_collection(&self) -> bool {
        self.in_tree && self.organization.is_none()
    }

    /// Scope of the deepest identifier present.
    #[must_use]
    pub fn deepest_scope(&self) -> Option<ResourceScope> {
        if self.environment.is_some() {
            Some(ResourceScope::Environment)
        } else if self.secret_group.is_some() {
            Some(ResourceScope::SecretGroup)
        } else if self.organization.is_some() {
            Some(ResourceScope::Organization)
        } else {
            None
        }
    }

    /// First special marker after the structural prefix. Identifier slots
    /// are never inspected.
    #[must_use]
    pub fn special_kind(&self) -> Option<SpecialKind> {
        self.rest
            .iter()
            .enumerate()
            .find_map(|(i, segment)| match segment.as_str() {
                "members" => Some(SpecialKind::Membership),
                "secrets" => Some(SpecialKind::SecretAccess),
                "providers" => Some(SpecialKind::ProviderConfig),
                "permissions" => match self.rest.get(i + 1).map(String::as_str) {
                    Some("grant") => Some(SpecialKind::PermissionGrant),
                    Some("revoke") => Some(SpecialKind::PermissionRevoke),
                    _ => None,
                },
                _ => None,
            })
    }
}

/// Classify a request.
///
/// # Errors
/// - [`ClassifyError::UnsupportedMethod`] for methods outside
///   `GET/HEAD/POST/PUT/PATCH/DELETE`
/// - [`ClassifyError::NoResource`] when the path carries no identifier and
///   is not tenant creation
pub fn classify(method: &Method, path: &ResourcePath) -> Result<RouteClassification, ClassifyError> {
    let generic = domain_action(method)?;

    if *method == Method::POST && path.is_organization_collection() {
        return Ok(RouteClassification::TenantCreation);
    }

    let scope = path.deepest_scope().ok_or(ClassifyError::NoResource)?;

    if let Some(kind) = path.special_kind() {
        return Ok(RouteClassification::SpecialResource {
            kind,
            scope,
            action: special_action(kind, generic),
        });
    }

    Ok(RouteClassification::DomainResource {
        scope,
        action: generic,
    })
}

fn domain_action(method: &Method) -> Result<Action, ClassifyError> {
    let name = match *method {
        Method::GET | Method::HEAD => actions::READ,
        Method::POST | Method::PUT | Method::PATCH => actions::WRITE,
        Method::DELETE => actions::DELETE,
        _ => return Err(ClassifyError::UnsupportedMethod),
    };
    Ok(Action::new(name))
}

fn special_action(kind: SpecialKind, generic: Action) -> Action {
    match kind {
        SpecialKind::SecretAccess => generic,
        SpecialKind::PermissionGrant => Action::new(actions::GRANT),
        SpecialKind::PermissionRevoke => Action::new(actions::REVOKE),
        SpecialKind::Membership | SpecialKind::ProviderConfig => {
            if generic.as_str() == actions::READ {
                generic
            } else {
                Action::new(actions::ADMIN)
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const ORG: &str = "11111111-1111-1111-1111-111111111111";
    const SG: &str = "33333333-3333-3333-3333-333333333333";
    const ENV: &str = "44444444-4444-4444-4444-444444444444";

    fn run(method: Method, raw: &str) -> Result<RouteClassification, ClassifyError> {
        let normalized = normalize(raw, "/api/v1")?;
        classify(&method, &ResourcePath::parse(&normalized))
    }

    fn special(kind: SpecialKind, scope: ResourceScope, action: &str) -> RouteClassification {
        RouteClassification::SpecialResource {
            kind,
            scope,
            action: Action::new(action),
        }
    }

    fn domain(scope: ResourceScope, action: &str) -> RouteClassification {
        RouteClassification::DomainResource {
            scope,
            action: Action::new(action),
        }
    }

    // ── normalize ────────────────────────────────────────────────────

    #[test]
    fn normalize_strips_prefix_and_trailing_slashes() {
        assert_eq!(
            normalize("/api/v1/organizations/", "/api/v1").unwrap(),
            "/organizations"
        );
        assert_eq!(normalize("/api/v1", "/api/v1").unwrap(), "/");
        assert_eq!(normalize("/api/v1/", "/api/v1/").unwrap(), "/");
    }

    #[test]
    fn normalize_requires_prefix_on_segment_boundary() {
        assert_eq!(
            normalize("/api/v10/organizations", "/api/v1"),
            Err(ClassifyError::NoResource)
        );
        assert_eq!(
            normalize("/organizations", "/api/v1"),
            Err(ClassifyError::NoResource)
        );
    }

    #[test]
    fn normalize_rejects_empty_segments() {
        assert_eq!(
            normalize("/api/v1/organizations//members", "/api/v1"),
            Err(ClassifyError::EmptySegment)
        );
    }

    #[test]
    fn empty_prefix_keeps_path() {
        assert_eq!(
            normalize("/organizations/x", "").unwrap(),
            "/organizations/x"
        );
    }

    // ── parse ────────────────────────────────────────────────────────

    #[test]
    fn parse_full_chain() {
        let p = ResourcePath::parse(&format!(
            "/organizations/{ORG}/secret-groups/{SG}/environments/{ENV}/secrets/db-password"
        ));
        assert_eq!(p.organization.as_deref(), Some(ORG));
        assert_eq!(p.secret_group.as_deref(), Some(SG));
        assert_eq!(p.environment.as_deref(), Some(ENV));
        assert_eq!(p.deepest_scope(), Some(ResourceScope::Environment));
        assert_eq!(p.special_kind(), Some(SpecialKind::SecretAccess));
    }

    #[test]
    fn parse_outside_tree_has_no_scope() {
        let p = ResourcePath::parse("/users/me");
        assert!(!p.is_organization_collection());
        assert_eq!(p.deepest_scope(), None);
    }

    // ── classify ─────────────────────────────────────────────────────

    #[test]
    fn post_org_collection_is_tenant_creation() {
        assert_eq!(
            run(Method::POST, "/api/v1/organizations"),
            Ok(RouteClassification::TenantCreation)
        );
        assert_eq!(
            run(Method::POST, "/api/v1/organizations/"),
            Ok(RouteClassification::TenantCreation)
        );
    }

    #[test]
    fn get_org_collection_has_no_resource() {
        assert_eq!(
            run(Method::GET, "/api/v1/organizations"),
            Err(ClassifyError::NoResource)
        );
    }

    #[test]
    fn members_under_secret_group_is_membership() {
        let path = format!("/api/v1/organizations/{ORG}/secret-groups/{SG}/members");

        assert_eq!(
            run(Method::GET, &path),
            Ok(special(SpecialKind::Membership, ResourceScope::SecretGroup, "read"))
        );
        assert_eq!(
            run(Method::POST, &path),
            Ok(special(SpecialKind::Membership, ResourceScope::SecretGroup, "admin"))
        );
        assert_eq!(
            run(Method::DELETE, &format!("{path}/some-user")),
            Ok(special(SpecialKind::Membership, ResourceScope::SecretGroup, "admin"))
        );
    }

    #[test]
    fn members_under_organization_has_organization_scope() {
        assert_eq!(
            run(Method::GET, &format!("/api/v1/organizations/{ORG}/members")),
            Ok(special(SpecialKind::Membership, ResourceScope::Organization, "read"))
        );
    }

    #[test]
    fn secret_group_without_environment_is_secret_group_scope() {
        assert_eq!(
            run(
                Method::GET,
                &format!("/api/v1/organizations/{ORG}/secret-groups/{SG}")
            ),
            Ok(domain(ResourceScope::SecretGroup, "read"))
        );
        assert_eq!(
            run(
                Method::POST,
                &format!("/api/v1/organizations/{ORG}/secret-groups/{SG}/environments")
            ),
            Ok(domain(ResourceScope::SecretGroup, "write"))
        );
    }

    #[test]
    fn environment_secrets_use_domain_mapping() {
        let path =
            format!("/api/v1/organizations/{ORG}/secret-groups/{SG}/environments/{ENV}/secrets");

        assert_eq!(
            run(Method::GET, &path),
            Ok(special(SpecialKind::SecretAccess, ResourceScope::Environment, "read"))
        );
        assert_eq!(
            run(Method::PUT, &path),
            Ok(special(SpecialKind::SecretAccess, ResourceScope::Environment, "write"))
        );
        assert_eq!(
            run(Method::DELETE, &format!("{path}/api-key")),
            Ok(special(SpecialKind::SecretAccess, ResourceScope::Environment, "delete"))
        );
    }

    #[test]
    fn permission_grant_and_revoke() {
        let base = format!("/api/v1/organizations/{ORG}/permissions");

        assert_eq!(
            run(Method::POST, &format!("{base}/grant")),
            Ok(special(SpecialKind::PermissionGrant, ResourceScope::Organization, "grant"))
        );
        assert_eq!(
            run(Method::POST, &format!("{base}/revoke")),
            Ok(special(SpecialKind::PermissionRevoke, ResourceScope::Organization, "revoke"))
        );
        // bare `permissions` is not a marker
        assert_eq!(
            run(Method::GET, &base),
            Ok(domain(ResourceScope::Organization, "read"))
        );
    }

    #[test]
    fn providers_require_admin_to_change() {
        let path = format!("/api/v1/organizations/{ORG}/secret-groups/{SG}/providers");

        assert_eq!(
            run(Method::GET, &path),
            Ok(special(SpecialKind::ProviderConfig, ResourceScope::SecretGroup, "read"))
        );
        assert_eq!(
            run(Method::PATCH, &path),
            Ok(special(SpecialKind::ProviderConfig, ResourceScope::SecretGroup, "admin"))
        );
    }

    #[test]
    fn domain_actions_follow_method() {
        let path = format!("/api/v1/organizations/{ORG}");

        assert_eq!(run(Method::GET, &path), Ok(domain(ResourceScope::Organization, "read")));
        assert_eq!(run(Method::HEAD, &path), Ok(domain(ResourceScope::Organization, "read")));
        assert_eq!(run(Method::PUT, &path), Ok(domain(ResourceScope::Organization, "write")));
        assert_eq!(run(Method::PATCH, &path), Ok(domain(ResourceScope::Organization, "write")));
        assert_eq!(run(Method::DELETE, &path), Ok(domain(ResourceScope::Organization, "delete")));
    }

    #[test]
    fn unsupported_methods_are_rejected() {
        let path = format!("/api/v1/organizations/{ORG}/members");

        assert_eq!(run(Method::OPTIONS, &path), Err(ClassifyError::UnsupportedMethod));
        assert_eq!(run(Method::TRACE, &path), Err(ClassifyError::UnsupportedMethod));
    }

    #[test]
    fn marker_words_in_identifier_slots_are_not_markers() {
        // an organization identifier that happens to be a marker word
        assert_eq!(
            run(Method::GET, "/api/v1/organizations/members"),
            Ok(domain(ResourceScope::Organization, "read"))
        );
        assert_eq!(
            run(
                Method::GET,
                &format!("/api/v1/organizations/{ORG}/secret-groups/secrets")
            ),
            Ok(domain(ResourceScope::SecretGroup, "read"))
        );
    }

    #[test]
    fn markers_match_whole_segments_only() {
        assert_eq!(
            run(
                Method::GET,
                &format!("/api/v1/organizations/{ORG}/secret-groups/{SG}/membership-report")
            ),
            Ok(domain(ResourceScope::SecretGroup, "read"))
        );
    }

    #[test]
    fn first_marker_wins() {
        // a secret literally named `members`
        assert_eq!(
            run(
                Method::GET,
                &format!(
                    "/api/v1/organizations/{ORG}/secret-groups/{SG}/environments/{ENV}/secrets/members"
                )
            ),
            Ok(special(SpecialKind::SecretAccess, ResourceScope::Environment, "read"))
        );
    }

    #[test]
    fn paths_outside_the_tree_have_no_resource() {
        assert_eq!(run(Method::GET, "/api/v1/users/me"), Err(ClassifyError::NoResource));
        assert_eq!(run(Method::GET, "/api/v1"), Err(ClassifyError::NoResource));
    }

    #[test]
    fn display_includes_kind_scope_and_action() {
        let c = special(SpecialKind::Membership, ResourceScope::SecretGroup, "admin");
        assert_eq!(c.to_string(), "special_resource(membership, secret_group, admin)");
        assert_eq!(c.label(), "special_resource");
        assert_eq!(c.scope(), Some(ResourceScope::SecretGroup));
    }
}
