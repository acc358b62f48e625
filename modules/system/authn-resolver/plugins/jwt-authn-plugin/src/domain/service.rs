//! Service implementation for the JWT `AuthN` resolver plugin.

use authn_resolver_sdk::{AuthNResolverError, AuthenticationResult};

use crate::codec::{CodecError, PrincipalFields, TokenCodec};
use crate::config::JwtAuthNConfig;

/// JWT `AuthN` resolver service.
///
/// Wraps a [`TokenCodec`] and turns verified claims into a request
/// principal.
#[derive(Debug, Clone)]
pub struct Service {
    codec: TokenCodec,
}

impl Service {
    /// Create a service from plugin configuration.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidConfig`] if the secret or validity window
    /// is unusable.
    pub fn from_config(cfg: &JwtAuthNConfig) -> Result<Self, CodecError> {
        Ok(Self {
            codec: TokenCodec::new(cfg)?,
        })
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a token for the given identity attributes.
    ///
    /// # Errors
    /// Returns [`CodecError::Encoding`] if signing fails.
    pub fn issue(&self, fields: &PrincipalFields) -> Result<String, CodecError> {
        self.codec.issue(fields)
    }

    /// Verify a bearer token and build the authenticated principal.
    ///
    /// # Errors
    /// - `ExpiredToken` if the token is past its expiry
    /// - `InvalidToken` for a bad signature or unparseable token
    pub fn authenticate(&self, bearer_token: &str) -> Result<AuthenticationResult, AuthNResolverError> {
        let claims = self.codec.verify(bearer_token).map_err(map_codec_error)?;
        let subject_id = claims.subject_id;
        let principal = claims
            .into_principal(bearer_token)
            .map_err(map_codec_error)?;

        tracing::debug!(%subject_id, "bearer token verified");
        Ok(AuthenticationResult { principal })
    }
}

fn map_codec_error(err: CodecError) -> AuthNResolverError {
    match err {
        CodecError::Expired => AuthNResolverError::ExpiredToken,
        CodecError::InvalidSignature | CodecError::Malformed(_) => {
            AuthNResolverError::InvalidToken(err.to_string())
        }
        CodecError::Encoding(_) | CodecError::InvalidConfig(_) => {
            AuthNResolverError::Internal(err.to_string())
        }
    }
}
