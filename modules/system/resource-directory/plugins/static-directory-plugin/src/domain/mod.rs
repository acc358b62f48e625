//! Domain layer for the static resource directory plugin.

mod client;
pub mod service;

pub use service::{DirectoryConfigError, Service};
