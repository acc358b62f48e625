#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Coffer API gateway: principal extraction, route classification, resource
//! resolution and the authorization decision gate, as axum middleware.

pub mod auth;
pub mod authz;
pub mod config;
pub mod cors;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod module;

pub use auth::AuthRequirement;
pub use authz::{AuthorizationDecision, AuthorizationGate, RouteClassification, SpecialKind};
pub use config::{ApiGatewayConfig, CorsConfig, Defaults, PublicRoute};
pub use error::{ErrorBody, GateError};
pub use extract::{Authenticated, Classified};
pub use module::ApiGateway;
