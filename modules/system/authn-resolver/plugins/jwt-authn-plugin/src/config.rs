//! Configuration for the JWT `AuthN` resolver plugin.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Shortest accepted HS256 secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

fn default_validity() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn serialize_redacted<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str("[REDACTED]")
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtAuthNConfig {
    /// Symmetric signing secret (HS256). Must be at least [`MIN_SECRET_LEN`] bytes.
    /// Never written back out: serializes as `[REDACTED]`.
    #[serde(
        deserialize_with = "deserialize_secret",
        serialize_with = "serialize_redacted"
    )]
    pub secret: SecretString,

    /// How long an issued token stays valid, counted from issuance.
    #[serde(with = "coffer_utils::humantime_serde")]
    pub validity: Duration,

    /// Optional `iss` claim. When set, it is stamped on issued tokens and
    /// required on verified ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl Default for JwtAuthNConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::from(String::new()),
            validity: default_validity(),
            issuer: None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn parses_from_json() {
        let cfg: JwtAuthNConfig = serde_json::from_value(serde_json::json!({
            "secret": "0123456789abcdef0123456789abcdef",
            "validity": "15m",
            "issuer": "coffer",
        }))
        .unwrap();

        assert_eq!(cfg.secret.expose_secret(), "0123456789abcdef0123456789abcdef");
        assert_eq!(cfg.validity, Duration::from_secs(900));
        assert_eq!(cfg.issuer.as_deref(), Some("coffer"));
    }

    #[test]
    fn defaults_to_one_day_validity() {
        let cfg: JwtAuthNConfig = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(cfg.validity, Duration::from_secs(86_400));
        assert!(cfg.issuer.is_none());
    }

    #[test]
    fn serializing_redacts_secret() {
        let cfg = JwtAuthNConfig {
            secret: SecretString::from("0123456789abcdef0123456789abcdef".to_owned()),
            ..JwtAuthNConfig::default()
        };
        let json = serde_json::to_value(&cfg).unwrap();

        assert_eq!(json["secret"], "[REDACTED]");
        assert_eq!(json["validity"], "1day");
    }

    #[test]
    fn rejects_unknown_fields() {
        let res = serde_json::from_value::<JwtAuthNConfig>(serde_json::json!({
            "secret": "x",
            "algorithm": "RS256",
        }));
        assert!(res.is_err());
    }
}
