#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! JWT `AuthN` Resolver Plugin
//!
//! Issues and verifies compact HS256 identity tokens carrying the Coffer
//! principal claims. Verification is stateless: no lookups, no I/O.
//!
//! ## Configuration
//!
//! ```yaml
//! authn:
//!   secret: "at-least-32-bytes-of-shared-secret-material"
//!   validity: 24h
//!   issuer: coffer
//! ```

pub mod codec;
pub mod config;
pub mod domain;

pub use codec::{CodecError, PrincipalFields, TokenClaims, TokenCodec};
pub use config::JwtAuthNConfig;
pub use domain::service::Service as JwtAuthNService;
