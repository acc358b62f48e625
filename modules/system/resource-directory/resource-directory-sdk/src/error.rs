//! Error types for the resource directory.

use thiserror::Error;

/// Errors that can occur when querying the directory.
///
/// An unknown identifier is not an error; it is reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backing store is not reachable.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
