#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Resource Directory Plugin
//!
//! Serves parent-chain lookups from a tree declared in configuration.
//!
//! ## Configuration
//!
//! ```yaml
//! directory:
//!   organizations:
//!     - "0b6f1a3c-0000-4000-8000-000000000001"
//!   secret_groups:
//!     - id: "0b6f1a3c-0000-4000-8000-000000000010"
//!       organization_id: "0b6f1a3c-0000-4000-8000-000000000001"
//!   environments:
//!     - id: "0b6f1a3c-0000-4000-8000-000000000100"
//!       secret_group_id: "0b6f1a3c-0000-4000-8000-000000000010"
//! ```

pub mod config;
pub mod domain;

pub use config::{EnvironmentEntry, SecretGroupEntry, StaticDirectoryConfig};
pub use domain::{DirectoryConfigError, Service as StaticDirectoryService};
