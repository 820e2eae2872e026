//! Error types and result handling for core operations.

use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by token store implementations.
///
/// The bundled in-memory store is infallible, but the trait keeps a fallible
/// signature so durable implementations can report backend failures without
/// changing the seam.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the operation.
    #[error("token store unavailable: {message}")]
    Unavailable {
        /// Backend error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error from a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }
}
