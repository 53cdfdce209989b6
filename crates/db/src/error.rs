//! Errors raised by document stores.

use thiserror::Error;

/// Result alias used across the storage layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a [`crate::DocumentStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store was closed and no longer accepts operations.
    #[error("document store is closed")]
    Closed,

    /// The configured endpoint names a backend this build cannot reach.
    #[error("unsupported store endpoint '{0}'; expected memory:// or file://<path>")]
    UnsupportedEndpoint(String),

    /// A document could not be accepted or read back.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
