//! `AuthN` Resolver SDK
//!
//! This crate provides the public API for bearer token authentication:
//!
//! - [`AuthNResolverClient`] - Public API trait for consumers
//! - [`AuthenticationResult`] - Authentication result model
//! - [`AuthNResolverError`] - Error types
//!
//! ## Usage
//!
//! The API gateway receives the client at construction time:
//!
//! ```ignore
//! use authn_resolver_sdk::AuthNResolverClient;
//!
//! let result = authn.authenticate("eyJhbGciOi...").await?;
//! let principal = result.principal;
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::AuthNResolverClient;
pub use error::AuthNResolverError;
pub use models::AuthenticationResult;
