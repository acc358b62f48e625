//! Resource context resolution: turns a classification into exactly one
//! authorization query, or a request error.

use std::sync::Arc;

use authz_resolver_sdk::{Action, AuthorizationQuery};
use coffer_security::{Principal, ResourceScope};
use resource_directory_sdk::{DirectoryError, ResourceDirectoryClient};
use serde::Deserialize;
use serde::de::IgnoredAny;
use uuid::Uuid;

use super::classifier::{ResourcePath, RouteClassification, SpecialKind};

const MAX_ROLE_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("malformed resource identifier")]
    MalformedResourceId,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("path identifiers do not form one parent chain")]
    ResourceMismatch,

    #[error("resource directory failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Outcome of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Decided without the enforcer.
    Allow,
    /// Must be sent to the enforcer.
    Query(AuthorizationQuery),
}

/// Path identifiers after UUID validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedIds {
    organization: Uuid,
    secret_group: Option<Uuid>,
    environment: Option<Uuid>,
}

impl ResolvedIds {
    fn from_path(path: &ResourcePath) -> Result<Self, ResolveError> {
        let organization = path
            .organization
            .as_deref()
            .ok_or(ResolveError::MalformedResourceId)
            .and_then(parse_id)?;
        let secret_group = path.secret_group.as_deref().map(parse_id).transpose()?;
        let environment = path.environment.as_deref().map(parse_id).transpose()?;

        Ok(Self {
            organization,
            secret_group,
            environment,
        })
    }

    fn id_for(self, scope: ResourceScope) -> Option<Uuid> {
        match scope {
            ResourceScope::Organization => Some(self.organization),
            ResourceScope::SecretGroup => self.secret_group,
            ResourceScope::Environment => self.environment,
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ResolveError> {
    Uuid::try_parse(raw).map_err(|_| ResolveError::MalformedResourceId)
}

/// Body fields read from membership and permission requests. Unknown fields
/// belong to the business payload and are ignored.
#[derive(Debug, Default, Deserialize)]
struct RolePayload {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    user_id: Option<IgnoredAny>,
    #[serde(default)]
    group_id: Option<IgnoredAny>,
    #[serde(default)]
    principal_type: Option<String>,
}

fn is_valid_role(role: &str) -> bool {
    !role.is_empty()
        && role.len() <= MAX_ROLE_LEN
        && role
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Append `:role=<role>` and `:target=<user|group>` from the request body.
///
/// An empty body leaves the action unchanged.
fn qualify_action(action: Action, body: &[u8]) -> Result<Action, ResolveError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(action);
    }

    let payload: RolePayload = serde_json::from_slice(body)
        .map_err(|e| ResolveError::MalformedPayload(e.to_string()))?;

    let mut action = action;
    if let Some(role) = payload.role.as_deref() {
        if !is_valid_role(role) {
            return Err(ResolveError::MalformedPayload(
                "role must match [A-Za-z0-9_-]{1,64}".to_owned(),
            ));
        }
        action = action.with_qualifier("role", role);
    }

    let target = match (
        payload.principal_type.as_deref(),
        payload.user_id.is_some(),
        payload.group_id.is_some(),
    ) {
        (Some("user"), _, true) | (Some("group"), true, _) => {
            return Err(ResolveError::MalformedPayload(
                "principal_type contradicts the supplied id".to_owned(),
            ));
        }
        (Some(t @ ("user" | "group")), _, _) => Some(t),
        (Some(_), _, _) => {
            return Err(ResolveError::MalformedPayload(
                "principal_type must be 'user' or 'group'".to_owned(),
            ));
        }
        (None, true, true) => {
            return Err(ResolveError::MalformedPayload(
                "both user_id and group_id given".to_owned(),
            ));
        }
        (None, true, false) => Some("user"),
        (None, false, true) => Some("group"),
        (None, false, false) => None,
    };
    if let Some(target) = target {
        action = action.with_qualifier("target", target);
    }

    Ok(action)
}

/// Resolves classifications into authorization queries.
#[derive(Clone)]
pub struct ResourceResolver {
    directory: Arc<dyn ResourceDirectoryClient>,
    strict_hierarchy: bool,
}

impl ResourceResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn ResourceDirectoryClient>, strict_hierarchy: bool) -> Self {
        Self {
            directory,
            strict_hierarchy,
        }
    }

    /// Resolve one request.
    ///
    /// `body` is only read for membership and permission routes.
    ///
    /// # Errors
    /// - [`ResolveError::MalformedResourceId`] if any path identifier is not a UUID
    /// - [`ResolveError::MalformedPayload`] if a role payload cannot be read
    /// - [`ResolveError::ResourceMismatch`] if the path identifiers do not
    ///   form one parent chain
    /// - [`ResolveError::Directory`] if the directory lookup fails
    pub async fn resolve(
        &self,
        principal: &Principal,
        classification: &RouteClassification,
        path: &ResourcePath,
        body: &[u8],
    ) -> Result<Resolution, ResolveError> {
        let (scope, action, check_hierarchy) = match classification {
            RouteClassification::TenantCreation => return Ok(Resolution::Allow),
            RouteClassification::SpecialResource {
                kind,
                scope,
                action,
            } => {
                let action = if kind.reads_role_payload() {
                    qualify_action(action.clone(), body)?
                } else {
                    action.clone()
                };
                (*scope, action, self.checks_hierarchy_for(Some(*kind)))
            }
            RouteClassification::DomainResource { scope, action } => {
                (*scope, action.clone(), self.checks_hierarchy_for(None))
            }
        };

        let ids = ResolvedIds::from_path(path)?;
        let resource_id = ids.id_for(scope).ok_or(ResolveError::MalformedResourceId)?;

        if check_hierarchy {
            self.check_parent_chain(ids).await?;
        }

        Ok(Resolution::Query(AuthorizationQuery::new(
            principal,
            scope,
            resource_id,
            action,
        )))
    }

    fn checks_hierarchy_for(&self, kind: Option<SpecialKind>) -> bool {
        self.strict_hierarchy || kind.is_some_and(SpecialKind::requires_hierarchy_check)
    }

    /// Environment → secret group → organization must match the path.
    async fn check_parent_chain(&self, ids: ResolvedIds) -> Result<(), ResolveError> {
        if let (Some(env), Some(sg)) = (ids.environment, ids.secret_group) {
            self.expect_parent(ResourceScope::Environment, env, sg)
                .await?;
        }
        if let Some(sg) = ids.secret_group {
            self.expect_parent(ResourceScope::SecretGroup, sg, ids.organization)
                .await?;
        }
        Ok(())
    }

    async fn expect_parent(
        &self,
        scope: ResourceScope,
        id: Uuid,
        expected: Uuid,
    ) -> Result<(), ResolveError> {
        match self.directory.parent_of(scope, id).await? {
            Some(parent) if parent == expected => Ok(()),
            _ => Err(ResolveError::ResourceMismatch),
        }
    }
}

impl std::fmt::Debug for ResourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceResolver")
            .field("strict_hierarchy", &self.strict_hierarchy)
            .finish_non_exhaustive()
    }
}
