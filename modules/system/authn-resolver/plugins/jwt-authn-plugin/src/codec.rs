//! Token codec: issues and verifies signed identity tokens.
//!
//! Tokens are compact HS256 JWTs. Verification is stateless and performs no
//! I/O; the result is exactly the claim set that was encoded at issuance.

use chrono::{DateTime, Utc};
use coffer_security::Principal;
use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{JwtAuthNConfig, MIN_SECRET_LEN};

/// Errors produced by the codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),

    #[error("invalid codec configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    fn from_jwt(err: &jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Identity attributes stamped into a token at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalFields {
    pub subject_id: Uuid,
    pub identity_provider: String,
    pub provider_subject_id: String,
    pub email: String,
    pub display_name: String,
}

/// Claim set carried by every Coffer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    #[serde(rename = "idp")]
    pub identity_provider: String,
    #[serde(rename = "idp_sub")]
    pub provider_subject_id: String,
    pub email: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Seconds since the Unix epoch.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Seconds since the Unix epoch; always `issued_at + validity`.
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl TokenClaims {
    /// Build the request principal from verified claims.
    ///
    /// # Errors
    /// Returns [`CodecError::Malformed`] if a timestamp is out of range.
    pub fn into_principal(self, bearer_token: &str) -> Result<Principal, CodecError> {
        let issued_at = timestamp(self.issued_at, "iat")?;
        let expires_at = timestamp(self.expires_at, "exp")?;

        Ok(Principal::builder()
            .subject_id(self.subject_id)
            .identity_provider(self.identity_provider)
            .provider_subject_id(self.provider_subject_id)
            .email(self.email)
            .display_name(self.display_name)
            .issued_at(issued_at)
            .expires_at(expires_at)
            .bearer_token(bearer_token.to_owned())
            .build())
    }
}

fn timestamp(secs: i64, claim: &str) -> Result<DateTime<Utc>, CodecError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CodecError::Malformed(format!("'{claim}' out of range")))
}

/// Symmetric-key token codec.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_secs: i64,
    issuer: Option<String>,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from plugin configuration.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidConfig`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes or the validity window is zero or too large.
    pub fn new(cfg: &JwtAuthNConfig) -> Result<Self, CodecError> {
        let secret = cfg.secret.expose_secret().as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(CodecError::InvalidConfig(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let validity_secs = i64::try_from(cfg.validity.as_secs())
            .map_err(|_| CodecError::InvalidConfig("validity window too large".to_owned()))?;
        if validity_secs == 0 {
            return Err(CodecError::InvalidConfig(
                "validity window must be at least one second".to_owned(),
            ));
        }

        // Expiry is checked separately against the caller's clock, see `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(iss) = &cfg.issuer {
            validation.set_issuer(&[iss]);
            validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity_secs,
            issuer: cfg.issuer.clone(),
            validation,
        })
    }

    /// Issue a token for `fields`, valid from now for the configured window.
    ///
    /// # Errors
    /// Returns [`CodecError::Encoding`] if signing fails.
    pub fn issue(&self, fields: &PrincipalFields) -> Result<String, CodecError> {
        self.issue_at(fields, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// Deterministic: identical fields and `now` produce identical tokens.
    ///
    /// # Errors
    /// Returns [`CodecError::Encoding`] if signing fails.
    pub fn issue_at(&self, fields: &PrincipalFields, now: DateTime<Utc>) -> Result<String, CodecError> {
        let issued_at = now.timestamp();
        let claims = TokenClaims {
            subject_id: fields.subject_id,
            identity_provider: fields.identity_provider.clone(),
            provider_subject_id: fields.provider_subject_id.clone(),
            email: fields.email.clone(),
            display_name: fields.display_name.clone(),
            issued_at,
            expires_at: issued_at.saturating_add(self.validity_secs),
            issuer: self.issuer.clone(),
        };
        self.encode_claims(&claims)
    }

    /// Sign an arbitrary claim set with this codec's key.
    ///
    /// # Errors
    /// Returns [`CodecError::Encoding`] if signing fails.
    pub fn encode_claims(&self, claims: &TokenClaims) -> Result<String, CodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CodecError::Encoding(e.to_string()))
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    /// See [`TokenCodec::verify_at`].
    pub fn verify(&self, token: &str) -> Result<TokenClaims, CodecError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// Expiry is evaluated before the signature, so a token whose `exp` is in
    /// the past is reported as [`CodecError::Expired`] whatever its signature.
    ///
    /// # Errors
    /// - [`CodecError::Malformed`] if the token does not parse into [`TokenClaims`]
    /// - [`CodecError::Expired`] if `now` is past `exp`
    /// - [`CodecError::InvalidSignature`] if the signature does not match the secret
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, CodecError> {
        // Signature is checked below; this pass only reads `exp`.
        let unverified = insecure_decode::<TokenClaims>(token)
            .map_err(|e| CodecError::from_jwt(&e))?
            .claims;

        if now.timestamp() > unverified.expires_at {
            return Err(CodecError::Expired);
        }

        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| CodecError::from_jwt(&e))
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validity_secs", &self.validity_secs)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
