//! Decision gate: classify → resolve → enforce, then allow or reject.

use std::sync::Arc;

use authz_resolver_sdk::{AuthZResolverClient, EnforcerError, PolicyEnforcer};
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use coffer_security::Principal;
use http_body_util::LengthLimitError;
use resource_directory_sdk::ResourceDirectoryClient;

use super::classifier::{self, ClassifyError, ResourcePath, RouteClassification};
use super::resolver::{ResolveError, Resolution, ResourceResolver};
use crate::auth::AuthRequirement;
use crate::config::ApiGatewayConfig;
use crate::error::GateError;

/// Terminal outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allow,
    Deny(GateError),
}

impl AuthorizationDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Request authorization pipeline shared by every request.
///
/// Immutable after construction; wrap in an `Arc` and pass as middleware state.
pub struct AuthorizationGate {
    enforcer: PolicyEnforcer,
    resolver: ResourceResolver,
    api_prefix: String,
    body_limit: usize,
}

impl AuthorizationGate {
    #[must_use]
    pub fn new(
        authz: Arc<dyn AuthZResolverClient>,
        directory: Arc<dyn ResourceDirectoryClient>,
        config: &ApiGatewayConfig,
    ) -> Self {
        Self {
            enforcer: PolicyEnforcer::new(authz).with_timeout(config.enforcer_timeout),
            resolver: ResourceResolver::new(directory, config.strict_hierarchy),
            api_prefix: config.api_prefix.clone(),
            body_limit: config.defaults.body_limit_bytes,
        }
    }

    /// Normalize and classify a request path. Failures are logged here.
    ///
    /// # Errors
    /// - [`GateError::UnsupportedMethod`] for methods without a capability mapping
    /// - [`GateError::MalformedResourceId`] if the path addresses no resource
    pub fn classify(
        &self,
        principal: &Principal,
        method: &Method,
        path: &str,
    ) -> Result<(RouteClassification, ResourcePath), GateError> {
        let classified = classifier::normalize(path, &self.api_prefix).and_then(|normalized| {
            let resource_path = ResourcePath::parse(&normalized);
            classifier::classify(method, &resource_path).map(|c| (c, resource_path))
        });

        classified.map_err(|err| {
            let err = classify_error(err);
            tracing::warn!(
                subject_id = %principal.subject_id(),
                outcome = err.code(),
                %method,
                "request could not be classified"
            );
            err
        })
    }

    /// Resolve and enforce an already classified request.
    ///
    /// Calls the enforcer at most once. Every denial is logged here.
    pub async fn authorize(
        &self,
        principal: &Principal,
        classification: &RouteClassification,
        path: &ResourcePath,
        body: &[u8],
    ) -> AuthorizationDecision {
        let subject_id = principal.subject_id();

        let query = match self
            .resolver
            .resolve(principal, classification, path, body)
            .await
        {
            Ok(Resolution::Allow) => {
                tracing::debug!(
                    %subject_id,
                    classification = classification.label(),
                    "authorization allowed without enforcer"
                );
                return AuthorizationDecision::Allow;
            }
            Ok(Resolution::Query(query)) => query,
            Err(err) => return resolution_failed(subject_id, classification, err),
        };

        match self.enforcer.check(&query).await {
            Ok(()) => {
                tracing::debug!(
                    %subject_id,
                    classification = classification.label(),
                    resource_type = %query.resource_type,
                    resource_id = %query.resource_id,
                    action = %query.action,
                    "authorization allowed"
                );
                AuthorizationDecision::Allow
            }
            Err(EnforcerError::Denied) => {
                tracing::warn!(
                    subject_id = %query.subject_id,
                    classification = %classification,
                    resource_type = %query.resource_type,
                    resource_id = %query.resource_id,
                    action = %query.action,
                    outcome = "denied",
                    "authorization denied"
                );
                AuthorizationDecision::Deny(GateError::Forbidden)
            }
            Err(EnforcerError::EvaluationFailed(err)) => {
                tracing::error!(
                    subject_id = %query.subject_id,
                    classification = %classification,
                    resource_type = %query.resource_type,
                    resource_id = %query.resource_id,
                    action = %query.action,
                    outcome = "engine_unavailable",
                    error = %err,
                    "authorization engine failed"
                );
                AuthorizationDecision::Deny(GateError::AuthorizationEngineUnavailable)
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("enforcer", &self.enforcer)
            .field("resolver", &self.resolver)
            .field("api_prefix", &self.api_prefix)
            .finish_non_exhaustive()
    }
}

fn resolution_failed(
    subject_id: uuid::Uuid,
    classification: &RouteClassification,
    err: ResolveError,
) -> AuthorizationDecision {
    let gate_err = match err {
        ResolveError::MalformedResourceId => GateError::MalformedResourceId,
        ResolveError::MalformedPayload(msg) => GateError::MalformedPayload(msg),
        ResolveError::ResourceMismatch => GateError::ResourceMismatch,
        ResolveError::Directory(err) => {
            tracing::error!(
                %subject_id,
                classification = %classification,
                outcome = "directory_unavailable",
                error = %err,
                "resource directory lookup failed"
            );
            return AuthorizationDecision::Deny(GateError::AuthorizationEngineUnavailable);
        }
    };
    tracing::warn!(
        %subject_id,
        classification = %classification,
        outcome = gate_err.code(),
        error = %gate_err,
        "resource resolution failed"
    );
    AuthorizationDecision::Deny(gate_err)
}

fn classify_error(err: ClassifyError) -> GateError {
    match err {
        ClassifyError::UnsupportedMethod => GateError::UnsupportedMethod,
        ClassifyError::NoResource | ClassifyError::EmptySegment => GateError::MalformedResourceId,
    }
}

/// Whether a body read failed on the configured size limit rather than on
/// the transport.
fn exceeds_length_limit(err: &axum::Error) -> bool {
    std::iter::successors(Some(err as &(dyn std::error::Error + 'static)), |e| e.source())
        .any(|e| e.is::<LengthLimitError>())
}

/// Authorization middleware. Runs inside [`crate::auth::authn_middleware`].
///
/// For each request that requires authentication:
/// 1. Classifies `(method, path)`
/// 2. Buffers the body when the route carries a role payload
/// 3. Resolves and enforces
/// 4. Inserts the `RouteClassification` and `AuthorizationDecision` into the
///    request extensions, then runs the handler or rejects
pub async fn authz_middleware(
    State(gate): State<Arc<AuthorizationGate>>,
    req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<AuthRequirement>() == Some(&AuthRequirement::None) {
        return next.run(req).await;
    }

    let Some(principal) = req.extensions().get::<Principal>().cloned() else {
        tracing::error!("authorization gate reached without a principal; check middleware order");
        return GateError::Internal("principal missing".to_owned()).into_response();
    };

    let (classification, resource_path) =
        match gate.classify(&principal, req.method(), req.uri().path()) {
            Ok(classified) => classified,
            Err(err) => return err.into_response(),
        };

    let reads_payload = matches!(
        classification,
        RouteClassification::SpecialResource { kind, .. } if kind.reads_role_payload()
    );
    let (mut req, body) = if reads_payload {
        let (parts, body) = req.into_parts();
        match axum::body::to_bytes(body, gate.body_limit).await {
            Ok(bytes) => (Request::from_parts(parts, Body::from(bytes.clone())), bytes),
            Err(err) => {
                let err = if exceeds_length_limit(&err) {
                    GateError::PayloadTooLarge
                } else {
                    GateError::MalformedPayload(err.to_string())
                };
                tracing::warn!(
                    subject_id = %principal.subject_id(),
                    classification = %classification,
                    outcome = err.code(),
                    "request body could not be read"
                );
                return err.into_response();
            }
        }
    } else {
        (req, Bytes::new())
    };

    let decision = gate
        .authorize(&principal, &classification, &resource_path, &body)
        .await;

    req.extensions_mut().insert(classification);
    req.extensions_mut().insert(decision.clone());

    match decision {
        AuthorizationDecision::Allow => next.run(req).await,
        AuthorizationDecision::Deny(err) => err.into_response(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use authz_resolver_sdk::{AuthZResolverError, AuthorizationQuery};
    use coffer_security::ResourceScope;
    use resource_directory_sdk::DirectoryError;
    use uuid::Uuid;

    use super::*;

    const ORG: &str = "11111111-1111-1111-1111-111111111111";
    const SG: &str = "33333333-3333-3333-3333-333333333333";

    enum Answer {
        Allow,
        Deny,
        Fail,
        Hang,
    }

    struct CountingEnforcer {
        answer: Answer,
        calls: AtomicUsize,
    }

    impl CountingEnforcer {
        fn new(answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AuthZResolverClient for CountingEnforcer {
        async fn enforce(&self, _query: &AuthorizationQuery) -> Result<bool, AuthZResolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Answer::Allow => Ok(true),
                Answer::Deny => Ok(false),
                Answer::Fail => Err(AuthZResolverError::ServiceUnavailable("down".to_owned())),
                Answer::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(true)
                }
            }
        }
    }

    /// Every secret group belongs to `ORG`.
    struct FlatDirectory;

    #[async_trait]
    impl ResourceDirectoryClient for FlatDirectory {
        async fn parent_of(
            &self,
            scope: ResourceScope,
            _id: Uuid,
        ) -> Result<Option<Uuid>, DirectoryError> {
            Ok((scope == ResourceScope::SecretGroup).then(|| Uuid::parse_str(ORG).unwrap()))
        }
    }

    fn gate(enforcer: Arc<CountingEnforcer>) -> AuthorizationGate {
        let config = ApiGatewayConfig {
            enforcer_timeout: Duration::from_millis(50),
            ..ApiGatewayConfig::default()
        };
        AuthorizationGate::new(enforcer, Arc::new(FlatDirectory), &config)
    }

    async fn decide(
        gate: &AuthorizationGate,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> AuthorizationDecision {
        let principal = principal();
        match gate.classify(&principal, method, path) {
            Ok((classification, resource_path)) => {
                gate.authorize(&principal, &classification, &resource_path, body)
                    .await
            }
            Err(err) => AuthorizationDecision::Deny(err),
        }
    }

    fn principal() -> Principal {
        Principal::builder().subject_id(Uuid::new_v4()).build()
    }

    #[tokio::test]
    async fn allow_calls_enforcer_once() {
        let enforcer = CountingEnforcer::new(Answer::Allow);
        let gate = gate(enforcer.clone());

        let decision = decide(&gate, &Method::GET, &format!("/api/v1/organizations/{ORG}"), b"")
            .await;

        assert!(decision.is_allowed());
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tenant_creation_never_calls_enforcer() {
        let enforcer = CountingEnforcer::new(Answer::Deny);
        let gate = gate(enforcer.clone());

        let decision = decide(&gate, &Method::POST, "/api/v1/organizations/", b"{}")
            .await;

        assert_eq!(decision, AuthorizationDecision::Allow);
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denial_and_failure_are_distinct() {
        let path = format!("/api/v1/organizations/{ORG}/secret-groups/{SG}/secrets");

        let denied = decide(&gate(CountingEnforcer::new(Answer::Deny)), &Method::GET, &path, b"")
            .await;
        let failed = decide(&gate(CountingEnforcer::new(Answer::Fail)), &Method::GET, &path, b"")
            .await;

        assert_eq!(denied, AuthorizationDecision::Deny(GateError::Forbidden));
        assert_eq!(
            failed,
            AuthorizationDecision::Deny(GateError::AuthorizationEngineUnavailable)
        );
    }

    #[tokio::test]
    async fn enforcer_timeout_fails_closed() {
        let enforcer = CountingEnforcer::new(Answer::Hang);
        let gate = gate(enforcer.clone());

        let decision = decide(&gate, &Method::GET, &format!("/api/v1/organizations/{ORG}"), b"")
            .await;

        assert_eq!(
            decision,
            AuthorizationDecision::Deny(GateError::AuthorizationEngineUnavailable)
        );
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected_before_enforcer() {
        let enforcer = CountingEnforcer::new(Answer::Allow);
        let gate = gate(enforcer.clone());

        let decision = decide(&gate, &Method::OPTIONS, &format!("/api/v1/organizations/{ORG}"), b"")
            .await;

        assert_eq!(decision, AuthorizationDecision::Deny(GateError::UnsupportedMethod));
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn paths_without_identifier_fail_closed() {
        let enforcer = CountingEnforcer::new(Answer::Allow);
        let gate = gate(enforcer.clone());

        for path in ["/api/v1/organizations", "/api/v1/users/me", "/other/organizations"] {
            let decision = decide(&gate, &Method::GET, path, b"").await;
            assert_eq!(
                decision,
                AuthorizationDecision::Deny(GateError::MalformedResourceId),
                "{path}"
            );
        }
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn body_over_limit_is_recognized_as_length_error() {
        let err = axum::body::to_bytes(Body::from("x".repeat(32)), 8)
            .await
            .unwrap_err();

        assert!(exceeds_length_limit(&err));
    }
}
