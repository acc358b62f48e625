//! Request-level failures of the authentication and authorization pipeline.
//!
//! Every variant maps to one HTTP status and one stable `error_code`. Bodies
//! carry a generic message only; details stay in the logs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("missing or malformed Authorization header")]
    MissingCredential,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("authentication service unavailable")]
    AuthenticationUnavailable,

    #[error("malformed resource identifier")]
    MalformedResourceId,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("payload exceeds the body limit")]
    PayloadTooLarge,

    #[error("method not allowed")]
    UnsupportedMethod,

    #[error("resource hierarchy mismatch")]
    ResourceMismatch,

    #[error("forbidden")]
    Forbidden,

    #[error("authorization engine unavailable")]
    AuthorizationEngineUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl GateError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidToken | Self::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::MalformedResourceId | Self::MalformedPayload(_) | Self::ResourceMismatch => {
                StatusCode::BAD_REQUEST
            }
            Self::UnsupportedMethod => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Forbidden | Self::AuthorizationEngineUnavailable => StatusCode::FORBIDDEN,
            Self::AuthenticationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::AuthenticationUnavailable => "AUTHENTICATION_UNAVAILABLE",
            Self::MalformedResourceId => "MALFORMED_RESOURCE_ID",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::UnsupportedMethod => "METHOD_NOT_ALLOWED",
            Self::ResourceMismatch => "RESOURCE_MISMATCH",
            Self::Forbidden => "FORBIDDEN",
            Self::AuthorizationEngineUnavailable => "AUTHORIZATION_ENGINE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Caller-facing message. Never contains identifiers.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Missing or invalid Authorization header",
            Self::InvalidToken => "Authentication failed",
            Self::ExpiredToken => "Token expired",
            Self::AuthenticationUnavailable => "Authentication service unavailable",
            Self::MalformedResourceId => "Malformed resource identifier",
            Self::MalformedPayload(_) => "Malformed request payload",
            Self::PayloadTooLarge => "Request payload too large",
            Self::UnsupportedMethod => "Method not allowed",
            Self::ResourceMismatch => "Resource hierarchy mismatch",
            Self::Forbidden | Self::AuthorizationEngineUnavailable => "Forbidden",
            Self::Internal(_) => "Internal server error",
        }
    }
}

/// JSON body of every rejection.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error_code: &'static str,
    pub error_msg: &'static str,
}

impl From<&GateError> for ErrorBody {
    fn from(err: &GateError) -> Self {
        Self {
            success: false,
            error_code: err.code(),
            error_msg: err.public_message(),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}
