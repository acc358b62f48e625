//! Serde adapter for `std::time::Duration` written as human-readable strings
//! (`"250ms"`, `"2s"`, `"24h"`).
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Cfg {
//!     #[serde(with = "coffer_utils::humantime_serde")]
//!     timeout: Duration,
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

/// Serialize a duration as a humantime string.
///
/// # Errors
/// Propagates serializer errors.
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

/// Deserialize a duration from a humantime string.
///
/// # Errors
/// Returns a deserializer error if the string is not a valid duration.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim())
        .map_err(|e| D::Error::custom(format!("invalid duration '{raw}': {e}")))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "crate::humantime_serde")]
        value: Duration,
    }

    #[test]
    fn parses_human_strings() {
        let h: Holder = serde_json::from_str(r#"{"value":"1h 30m"}"#).unwrap();
        assert_eq!(h.value, Duration::from_secs(5400));

        let h: Holder = serde_json::from_str(r#"{"value":"250ms"}"#).unwrap();
        assert_eq!(h.value, Duration::from_millis(250));
    }

    #[test]
    fn rejects_garbage() {
        let err = serde_json::from_str::<Holder>(r#"{"value":"soon"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }

    #[test]
    fn serializes_back_to_string() {
        let json = serde_json::to_string(&Holder {
            value: Duration::from_secs(120),
        })
        .unwrap();
        assert_eq!(json, r#"{"value":"2m"}"#);
    }
}
