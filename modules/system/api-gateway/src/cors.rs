use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::{ApiGatewayConfig, CorsConfig};

/// Build the CORS layer from config. Unparseable entries are skipped with a warning.
#[must_use]
pub fn build_cors_layer(cfg: &ApiGatewayConfig) -> CorsLayer {
    let cors = cfg.cors.clone().unwrap_or_default();
    layer_from(&cors)
}

fn layer_from(cors: &CorsConfig) -> CorsLayer {
    let origins = if cors.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(parse_all(&cors.allowed_origins, "origin", |o| {
            HeaderValue::from_str(o).ok()
        }))
    };

    let methods = AllowMethods::list(parse_all(&cors.allowed_methods, "method", |m| {
        Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok()
    }));

    let headers = if cors.allowed_headers.iter().any(|h| h == "*") {
        AllowHeaders::from(Any)
    } else {
        AllowHeaders::list(parse_all(&cors.allowed_headers, "header", |h| {
            HeaderName::from_bytes(h.as_bytes()).ok()
        }))
    };

    let layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(Duration::from_secs(cors.max_age_seconds));

    // Credentials cannot be combined with wildcards.
    if cors.allow_credentials
        && !cors.allowed_origins.iter().any(|o| o == "*")
        && !cors.allowed_headers.iter().any(|h| h == "*")
    {
        layer.allow_credentials(true)
    } else {
        if cors.allow_credentials {
            tracing::warn!("CORS allow_credentials ignored: wildcard origin or header configured");
        }
        layer
    }
}

fn parse_all<T>(raw: &[String], what: &str, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    raw.iter()
        .filter_map(|value| {
            let parsed = parse(value);
            if parsed.is_none() {
                tracing::warn!(value = %value, "ignoring invalid CORS {what}");
            }
            parsed
        })
        .collect()
}
