use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_api_prefix() -> String {
    "/api/v1".to_owned()
}

fn default_public_routes() -> Vec<PublicRoute> {
    vec![PublicRoute {
        method: "GET".to_owned(),
        path: "/healthz".to_owned(),
    }]
}

fn default_enforcer_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// API gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiGatewayConfig {
    pub bind_addr: String,

    /// Version prefix stripped before route classification.
    pub api_prefix: String,

    /// Routes that skip authentication and authorization. Paths may use
    /// `{param}` or `:param` placeholders.
    pub public_routes: Vec<PublicRoute>,

    /// Check the parent chain of every identifier in the path, not only for
    /// secret and provider routes.
    pub strict_hierarchy: bool,

    /// Deadline for a single enforcer call.
    #[serde(with = "coffer_utils::humantime_serde")]
    pub enforcer_timeout: Duration,

    pub cors_enabled: bool,
    /// Optional detailed CORS configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsConfig>,

    /// Global defaults
    pub defaults: Defaults,
}

impl Default for ApiGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_prefix: default_api_prefix(),
            public_routes: default_public_routes(),
            strict_hierarchy: false,
            enforcer_timeout: default_enforcer_timeout(),
            cors_enabled: false,
            cors: None,
            defaults: Defaults::default(),
        }
    }
}

/// A `(method, path)` pair exempt from authentication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PublicRoute {
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Defaults {
    /// Global request body size limit in bytes
    pub body_limit_bytes: usize,
    /// Whole-request deadline
    #[serde(with = "coffer_utils::humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            body_limit_bytes: default_body_limit_bytes(),
            request_timeout: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CorsConfig {
    /// Allowed origins: `["*"]` means any
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods, e.g. `["GET","POST","OPTIONS","PUT","DELETE","PATCH"]`
    pub allowed_methods: Vec<String>,
    /// Allowed request headers; `["*"]` means any
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials
    pub allow_credentials: bool,
    /// Max age for preflight caching in seconds
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_owned()],
            allowed_methods: vec![
                "GET".to_owned(),
                "POST".to_owned(),
                "PUT".to_owned(),
                "PATCH".to_owned(),
                "DELETE".to_owned(),
                "OPTIONS".to_owned(),
            ],
            allowed_headers: vec!["*".to_owned()],
            allow_credentials: false,
            max_age_seconds: 600,
        }
    }
}
