#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod principal;
pub mod scope;

pub use principal::{Principal, PrincipalBuilder};
pub use scope::ResourceScope;
