use chrono::{DateTime, Utc};
use secrecy::SecretString;
use uuid::Uuid;

/// `Principal` is the authenticated identity behind a single request.
///
/// Built by the `AuthN` resolver right after token verification and inserted
/// into the request extensions. Every downstream component (authorization
/// gate, handlers) reads "who is calling" from this one value. It is never
/// mutated after construction and never outlives the request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Principal {
    /// Opaque, stable subject identifier issued by Coffer.
    subject_id: Uuid,
    /// Upstream identity provider that vouched for the subject (e.g. "github").
    identity_provider: String,
    /// Subject identifier as known by the identity provider.
    provider_subject_id: String,
    email: String,
    display_name: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Original bearer token. Never serialized/persisted.
    /// Wrapped in `SecretString` so `Debug` redacts the value automatically.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
}

impl Principal {
    /// Create a new `Principal` builder
    #[must_use]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// Create an anonymous `Principal` (nil subject, no identity attributes).
    ///
    /// Only ever attached to requests on explicitly public routes.
    #[must_use]
    pub fn anonymous() -> Self {
        PrincipalBuilder::default().build()
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_nil()
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn identity_provider(&self) -> &str {
        &self.identity_provider
    }

    #[must_use]
    pub fn provider_subject_id(&self) -> &str {
        &self.provider_subject_id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Get the original bearer token.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }
}

#[derive(Default)]
pub struct PrincipalBuilder {
    subject_id: Option<Uuid>,
    identity_provider: Option<String>,
    provider_subject_id: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    bearer_token: Option<SecretString>,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn identity_provider(mut self, provider: impl Into<String>) -> Self {
        self.identity_provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn provider_subject_id(mut self, id: impl Into<String>) -> Self {
        self.provider_subject_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            subject_id: self.subject_id.unwrap_or_default(),
            identity_provider: self.identity_provider.unwrap_or_default(),
            provider_subject_id: self.provider_subject_id.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            display_name: self.display_name.unwrap_or_default(),
            issued_at: self.issued_at.unwrap_or(DateTime::UNIX_EPOCH),
            expires_at: self.expires_at.unwrap_or(DateTime::UNIX_EPOCH),
            bearer_token: self.bearer_token,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn builder_full() {
        let subject_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let principal = Principal::builder()
            .subject_id(subject_id)
            .identity_provider("github")
            .provider_subject_id("gh-4242")
            .email("ada@example.com")
            .display_name("Ada")
            .issued_at(ts(1_700_000_000))
            .expires_at(ts(1_700_086_400))
            .bearer_token("tok-123".to_owned())
            .build();

        assert_eq!(principal.subject_id(), subject_id);
        assert_eq!(principal.identity_provider(), "github");
        assert_eq!(principal.provider_subject_id(), "gh-4242");
        assert_eq!(principal.email(), "ada@example.com");
        assert_eq!(principal.display_name(), "Ada");
        assert_eq!(principal.issued_at(), ts(1_700_000_000));
        assert_eq!(principal.expires_at(), ts(1_700_086_400));
        assert_eq!(
            principal.bearer_token().map(ExposeSecret::expose_secret),
            Some("tok-123"),
        );
        assert!(!principal.is_anonymous());
    }

    #[test]
    fn anonymous_has_nil_subject() {
        let principal = Principal::anonymous();

        assert!(principal.is_anonymous());
        assert_eq!(principal.subject_id(), Uuid::nil());
        assert!(principal.email().is_empty());
        assert!(principal.bearer_token().is_none());
    }

    #[test]
    fn debug_redacts_bearer_token() {
        let principal = Principal::builder()
            .subject_id(Uuid::new_v4())
            .bearer_token("super-secret".to_owned())
            .build();

        let dbg = format!("{principal:?}");
        assert!(!dbg.contains("super-secret"));
    }
}
