use axum::http::Method;
use axum::response::IntoResponse;
use std::{collections::HashMap, sync::Arc};

use authn_resolver_sdk::{AuthNResolverClient, AuthNResolverError};
use coffer_security::Principal;

use crate::config::ApiGatewayConfig;
use crate::error::GateError;

/// Public route matcher for one HTTP method.
#[derive(Clone)]
pub struct PublicRouteMatcher {
    matcher: matchit::Router<()>,
}

impl PublicRouteMatcher {
    fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    fn insert(&mut self, path: &str) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, ())
    }

    fn find(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Convert Axum path syntax `:param` to matchit syntax `{param}`
///
/// Config may use either form; matchit only understands `{id}`.
fn convert_axum_path_to_matchit(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ':' {
            result.push('{');
            while matches!(chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
                if let Some(c) = chars.next() {
                    result.push(c);
                }
            }
            result.push('}');
        } else {
            result.push(ch);
        }
    }

    result
}

/// Whether a route requires authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Public route or CORS preflight: no authentication, no authorization.
    None,
    /// Authentication and authorization required.
    Required,
}

/// Gateway route policy: every route is authenticated unless listed as public.
#[derive(Clone)]
pub struct GatewayRoutePolicy {
    public_matchers: Arc<HashMap<Method, PublicRouteMatcher>>,
}

impl GatewayRoutePolicy {
    #[must_use]
    pub fn new(public_matchers: Arc<HashMap<Method, PublicRouteMatcher>>) -> Self {
        Self { public_matchers }
    }

    /// Resolve the authentication requirement for a given (method, path).
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> AuthRequirement {
        let is_public = self
            .public_matchers
            .get(method)
            .is_some_and(|matcher| matcher.find(path));

        if is_public {
            AuthRequirement::None
        } else {
            AuthRequirement::Required
        }
    }
}

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub authn_client: Arc<dyn AuthNResolverClient>,
    pub route_policy: GatewayRoutePolicy,
    /// Preflights are exempt only when a `CorsLayer` is installed to answer them.
    pub cors_enabled: bool,
}

/// Build `GatewayRoutePolicy` from the configured public routes.
///
/// # Errors
/// Returns an error if a route has an unknown method or a conflicting pattern.
pub fn build_route_policy(cfg: &ApiGatewayConfig) -> Result<GatewayRoutePolicy, anyhow::Error> {
    let mut public_matchers_map: HashMap<Method, PublicRouteMatcher> = HashMap::new();

    for route in &cfg.public_routes {
        let method = Method::from_bytes(route.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid method '{}' in public route: {e}", route.method))?;
        let matcher = public_matchers_map
            .entry(method)
            .or_insert_with(PublicRouteMatcher::new);
        let matchit_path = convert_axum_path_to_matchit(&route.path);
        matcher.insert(&matchit_path).map_err(|e| {
            anyhow::anyhow!("Failed to insert public route pattern '{}': {e}", route.path)
        })?;
    }

    Ok(GatewayRoutePolicy::new(Arc::new(public_matchers_map)))
}

/// Authentication middleware that uses the `AuthN` Resolver to validate bearer tokens.
///
/// For each request:
/// 1. Skips CORS preflight requests when CORS is enabled
/// 2. Resolves the route's auth requirement via `GatewayRoutePolicy`
/// 3. For public routes: inserts an anonymous `Principal`
/// 4. For required routes: extracts bearer token, calls `AuthN` Resolver, inserts `Principal`
///
/// The `AuthRequirement` is always inserted so the authorization gate can skip
/// the same requests.
pub async fn authn_middleware(
    axum::extract::State(state): axum::extract::State<AuthState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    if state.cors_enabled && is_preflight_request(req.method(), req.headers()) {
        req.extensions_mut().insert(AuthRequirement::None);
        return next.run(req).await;
    }

    let requirement = state.route_policy.resolve(req.method(), req.uri().path());
    req.extensions_mut().insert(requirement);

    match requirement {
        AuthRequirement::None => {
            req.extensions_mut().insert(Principal::anonymous());
            next.run(req).await
        }
        AuthRequirement::Required => {
            let Some(token) = extract_bearer_token(req.headers()) else {
                tracing::debug!(
                    outcome = GateError::MissingCredential.code(),
                    "AuthN rejected: no bearer credential"
                );
                return GateError::MissingCredential.into_response();
            };

            match state.authn_client.authenticate(token).await {
                Ok(result) => {
                    req.extensions_mut().insert(result.principal);
                    next.run(req).await
                }
                Err(err) => authn_error_to_response(&err),
            }
        }
    }
}

/// Map an `AuthNResolverError` to the gateway rejection.
fn authn_error(err: &AuthNResolverError) -> GateError {
    match err {
        AuthNResolverError::InvalidToken(_) => GateError::InvalidToken,
        AuthNResolverError::ExpiredToken => GateError::ExpiredToken,
        AuthNResolverError::ServiceUnavailable(_) => GateError::AuthenticationUnavailable,
        AuthNResolverError::Internal(msg) => GateError::Internal(msg.clone()),
    }
}

fn authn_error_to_response(err: &AuthNResolverError) -> axum::response::Response {
    log_authn_error(err);
    authn_error(err).into_response()
}

/// Log authentication errors at appropriate levels.
///
/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_authn_error(err: &AuthNResolverError) {
    match err {
        AuthNResolverError::InvalidToken(msg) => {
            tracing::debug!(outcome = "INVALID_TOKEN", "AuthN rejected: {msg}");
        }
        AuthNResolverError::ExpiredToken => {
            tracing::debug!(outcome = "EXPIRED_TOKEN", "AuthN rejected: token expired");
        }
        AuthNResolverError::ServiceUnavailable(msg) => {
            tracing::error!("AuthN service unavailable: {msg}");
        }
        AuthNResolverError::Internal(msg) => tracing::error!("AuthN internal error: {msg}"),
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|token| !token.is_empty())
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &axum::http::HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::PublicRoute;
    use axum::http::{HeaderMap, HeaderValue, Method, header};

    fn build_test_policy(public_matchers: HashMap<Method, PublicRouteMatcher>) -> GatewayRoutePolicy {
        GatewayRoutePolicy::new(Arc::new(public_matchers))
    }

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_convert_axum_path_to_matchit() {
        assert_eq!(convert_axum_path_to_matchit("/users/:id"), "/users/{id}");
        assert_eq!(
            convert_axum_path_to_matchit("/posts/:post_id/comments/:comment_id"),
            "/posts/{post_id}/comments/{comment_id}"
        );
        assert_eq!(convert_axum_path_to_matchit("/healthz"), "/healthz");
        assert_eq!(
            convert_axum_path_to_matchit("/status/{component}"),
            "/status/{component}"
        );
    }

    #[test]
    fn explicit_public_route_with_path_params_returns_none() {
        let mut public_matchers = HashMap::new();
        let mut matcher = PublicRouteMatcher::new();
        matcher.insert("/status/{component}").unwrap();
        public_matchers.insert(Method::GET, matcher);

        let policy = build_test_policy(public_matchers);

        assert_eq!(
            policy.resolve(&Method::GET, "/status/db"),
            AuthRequirement::None
        );
    }

    #[test]
    fn unknown_route_requires_auth() {
        let policy = build_test_policy(HashMap::new());

        assert_eq!(
            policy.resolve(&Method::GET, "/api/v1/organizations"),
            AuthRequirement::Required
        );
    }

    #[test]
    fn public_route_is_method_specific() {
        let policy = build_route_policy(&ApiGatewayConfig::default()).unwrap();

        assert_eq!(policy.resolve(&Method::GET, "/healthz"), AuthRequirement::None);
        assert_eq!(
            policy.resolve(&Method::POST, "/healthz"),
            AuthRequirement::Required
        );
    }

    #[test]
    fn build_route_policy_accepts_axum_syntax_and_lowercase_method() {
        let cfg = ApiGatewayConfig {
            public_routes: vec![PublicRoute {
                method: "get".to_owned(),
                path: "/docs/:page".to_owned(),
            }],
            ..ApiGatewayConfig::default()
        };
        let policy = build_route_policy(&cfg).unwrap();

        assert_eq!(policy.resolve(&Method::GET, "/docs/intro"), AuthRequirement::None);
    }

    #[test]
    fn build_route_policy_rejects_duplicate_patterns() {
        let cfg = ApiGatewayConfig {
            public_routes: vec![
                PublicRoute {
                    method: "GET".to_owned(),
                    path: "/docs/{page}".to_owned(),
                },
                PublicRoute {
                    method: "GET".to_owned(),
                    path: "/docs/:page".to_owned(),
                },
            ],
            ..ApiGatewayConfig::default()
        };

        assert!(build_route_policy(&cfg).is_err());
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(
            extract_bearer_token(&headers_with_auth("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_bearer_token(&headers_with_auth("Bearer   ")), None);
        assert_eq!(extract_bearer_token(&headers_with_auth("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn authn_errors_map_one_to_one() {
        assert_eq!(
            authn_error(&AuthNResolverError::InvalidToken("sig".to_owned())),
            GateError::InvalidToken
        );
        assert_eq!(
            authn_error(&AuthNResolverError::ExpiredToken),
            GateError::ExpiredToken
        );
        assert_eq!(
            authn_error(&AuthNResolverError::ServiceUnavailable("x".to_owned())),
            GateError::AuthenticationUnavailable
        );
        assert_eq!(
            authn_error(&AuthNResolverError::Internal("x".to_owned())).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn preflight_detection() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://app.example"));
        assert!(!is_preflight_request(&Method::OPTIONS, &headers));

        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("GET"),
        );
        assert!(is_preflight_request(&Method::OPTIONS, &headers));
        assert!(!is_preflight_request(&Method::GET, &headers));
    }
}
