//! Axum extractors for handlers behind the gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use coffer_security::Principal;

use crate::authz::RouteClassification;
use crate::error::GateError;

/// The authenticated caller.
///
/// Rejects with 500 when the authentication middleware did not run: that is a
/// wiring bug, not a client error.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| {
                tracing::error!("Principal not found in request extensions; authn middleware missing");
                GateError::Internal("principal missing".to_owned())
            })
    }
}

/// The classification the gate authorized this request under.
#[derive(Debug, Clone)]
pub struct Classified(pub RouteClassification);

impl<S> FromRequestParts<S> for Classified
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RouteClassification>()
            .cloned()
            .map(Classified)
            .ok_or_else(|| {
                tracing::error!("RouteClassification not found in request extensions; authz middleware missing");
                GateError::Internal("classification missing".to_owned())
            })
    }
}
