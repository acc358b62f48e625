#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static `AuthZ` Resolver Plugin
//!
//! In-process enforcer for development and testing. It answers from a fixed
//! grant table and never inherits grants across hierarchy levels.
//!
//! ## Modes
//!
//! - `allow_all` (default): every query is allowed
//! - `deny_all`: every query is denied
//! - `static_grants`: a query is allowed when a grant for the same subject and
//!   resource lists either the exact action or its base capability
//!
//! ## Configuration
//!
//! ```yaml
//! authz:
//!   mode: static_grants
//!   grants:
//!     - subject_id: "7a1c0d2e-0000-4000-8000-00000000a11c"
//!       resource_type: organization
//!       resource_id: "0b6f1a3c-0000-4000-8000-000000000001"
//!       actions: [read, write, grant]
//! ```

pub mod config;
pub mod domain;

pub use config::{AuthZMode, Grant, StaticAuthZPluginConfig};
pub use domain::Service as StaticAuthZService;
