#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Resource Directory SDK
//!
//! Read-only view of the Organization → Secret group → Environment tree,
//! used by the gateway to confirm that identifiers in a request path belong
//! to each other before any authorization query is sent.
//!
//! - [`ResourceDirectoryClient`] - One-method lookup trait
//! - [`DirectoryError`] - Infrastructure errors

pub mod api;
pub mod error;

pub use api::ResourceDirectoryClient;
pub use error::DirectoryError;
