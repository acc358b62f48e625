#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `AuthZ` Resolver SDK
//!
//! This crate provides the public API for the enforcer seam of the gateway:
//!
//! - [`AuthZResolverClient`] - Enforcer contract, one method
//! - [`AuthorizationQuery`], [`Action`] - The exact tuple sent to the enforcer
//! - [`AuthZResolverError`] - Infrastructure errors
//! - [`pep`] - PEP helper ([`PolicyEnforcer`]) adding the deadline and the
//!   allow/deny split
//!
//! ## Usage
//!
//! ```ignore
//! use authz_resolver_sdk::{AuthorizationQuery, actions, pep::PolicyEnforcer};
//! use coffer_security::ResourceScope;
//!
//! // Create an enforcer once, during wiring
//! let enforcer = PolicyEnforcer::new(authz).with_timeout(Duration::from_secs(2));
//!
//! let query = AuthorizationQuery::new(&principal, ResourceScope::Environment, env_id, actions::READ);
//! enforcer.check(&query).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod pep;

// Re-export main types at crate root
pub use api::AuthZResolverClient;
pub use error::AuthZResolverError;
pub use models::{Action, AuthorizationQuery, actions};
pub use pep::{EnforcerError, PolicyEnforcer};
