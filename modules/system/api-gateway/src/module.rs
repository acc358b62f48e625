//! API Gateway definition
//!
//! Owns the HTTP server and the middleware stack that authenticates and
//! authorizes every request before it reaches a handler.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::middleware::from_fn_with_state;
use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn, routing::get};
use tokio_util::sync::CancellationToken;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use authn_resolver_sdk::AuthNResolverClient;
use authz_resolver_sdk::AuthZResolverClient;
use resource_directory_sdk::ResourceDirectoryClient;

use crate::auth;
use crate::authz::{AuthorizationGate, authz_middleware};
use crate::config::ApiGatewayConfig;
use crate::middleware;

/// HTTP front door: principal extraction, the authorization gate, and the
/// ambient layers (request id, tracing, timeout, body limit, CORS).
pub struct ApiGateway {
    config: ApiGatewayConfig,
    authn_client: Arc<dyn AuthNResolverClient>,
    gate: Arc<AuthorizationGate>,
}

impl ApiGateway {
    #[must_use]
    pub fn new(
        config: ApiGatewayConfig,
        authn_client: Arc<dyn AuthNResolverClient>,
        authz_client: Arc<dyn AuthZResolverClient>,
        directory: Arc<dyn ResourceDirectoryClient>,
    ) -> Self {
        let gate = Arc::new(AuthorizationGate::new(authz_client, directory, &config));
        Self {
            config,
            authn_client,
            gate,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiGatewayConfig {
        &self.config
    }

    /// Apply all middleware layers to a router (request ID, tracing, timeout, body limit, CORS, authn, authz)
    ///
    /// # Errors
    /// Returns an error if the public route table cannot be built.
    pub fn apply_middleware_stack(&self, mut router: Router) -> Result<Router> {
        let route_policy = auth::build_route_policy(&self.config)?;

        // `axum::Router::layer(...)` behaves like Tower layers: the **last** added layer
        // becomes the **outermost** layer and therefore runs **first** on the request path.
        //
        // Desired request execution order (outermost -> innermost):
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> BodyLimit -> CORS -> AuthN -> AuthZ -> Router
        //
        // Therefore we add layers in the reverse order (innermost -> outermost) below.
        let config = &self.config;

        // 7) Authorization gate (needs the Principal inserted by authn)
        router = router.layer(from_fn_with_state(self.gate.clone(), authz_middleware));

        // 6) Authentication
        let auth_state = auth::AuthState {
            authn_client: self.authn_client.clone(),
            route_policy,
            cors_enabled: config.cors_enabled,
        };
        router = router.layer(from_fn_with_state(auth_state, auth::authn_middleware));

        // 5) CORS (outer to auth so OPTIONS preflight short-circuits)
        if config.cors_enabled {
            router = router.layer(crate::cors::build_cors_layer(config));
        }

        // 4) Body limit
        router = router.layer(RequestBodyLimitLayer::new(config.defaults.body_limit_bytes));
        router = router.layer(DefaultBodyLimit::max(config.defaults.body_limit_bytes));

        // 3) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::GATEWAY_TIMEOUT,
            config.defaults.request_timeout,
        ));

        // 2) Record request_id into span + extensions (must be inner to Trace)
        router = router.layer(from_fn(middleware::request_id::push_req_id_to_extensions));

        // 1) Trace
        router = router.layer({
            use tower_http::trace::TraceLayer;
            use tracing::field::Empty;

            TraceLayer::new_for_http()
                .make_span_with(move |req: &axum::http::Request<axum::body::Body>| {
                    let hdr = middleware::request_id::header();
                    let rid = req
                        .headers()
                        .get(&hdr)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");

                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        module = "api_gateway",
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<axum::body::Body>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let ms = latency.as_millis();
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", ms);
                    },
                )
        });

        // 0) Request ID handling
        let x_request_id = middleware::request_id::header();
        // If missing, generate x-request-id first; then propagate it to the response.
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

        Ok(router)
    }

    /// Build the HTTP router: `routes` plus `/healthz`, under the full middleware stack.
    ///
    /// # Errors
    /// Returns an error if middleware setup fails.
    pub fn build_router(&self, routes: Router) -> Result<Router> {
        let router = routes.route("/healthz", get(|| async { "ok" }));
        self.apply_middleware_stack(router)
    }

    fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr> {
        bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))
    }

    /// Bind, then serve until `cancel` fires.
    ///
    /// # Errors
    /// Returns an error if the address is invalid, binding fails, or the server fails.
    pub async fn serve(&self, routes: Router, cancel: CancellationToken) -> Result<()> {
        let addr = Self::parse_bind_address(&self.config.bind_addr)?;
        let router = self.build_router(routes)?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {addr}");

        // Graceful shutdown on cancel
        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bind_address_must_be_socket_addr() {
        assert!(ApiGateway::parse_bind_address("127.0.0.1:8080").is_ok());
        assert!(ApiGateway::parse_bind_address("localhost").is_err());
    }
}
