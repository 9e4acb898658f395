//! Error Hierarchy for the Change-Watch Layer
//!
//! Splits caller mistakes, store-originated failures and the caller's own
//! cancellation into distinct variants so the watch loop can never mistake
//! one for another.

use config::ConfigError;

use crate::Revision;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for operations crossing the [`VersionedStore`](crate::VersionedStore) boundary.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input was rejected before any store interaction
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    /// Failure surfaced by `get` or `await_change`; propagated verbatim
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The caller's cancellation took effect
    #[error("watch canceled")]
    Canceled,

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True when this error is the watch's own cancellation rather than a
    /// store or argument failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidArgumentError {
    #[error("entry path must not be empty")]
    EmptyPath,

    #[error("entry path must be absolute: {0}")]
    RelativePath(String),

    #[error("JSON pointer must be empty or start with '/': {0}")]
    InvalidPointer(String),

    /// The zero revision addresses no committed state
    #[error("revision {0} is not a valid revision")]
    NullRevision(Revision),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Point-in-time reads never block on revisions that do not exist yet
    #[error("revision {requested} is ahead of head revision {head}")]
    RevisionOutOfRange { requested: Revision, head: Revision },

    /// The requested revision fell out of the retained history window
    #[error("revision {requested} has been pruned (oldest retained: {oldest})")]
    RevisionPruned { requested: Revision, oldest: Revision },

    /// Query projection could not be applied to the stored content
    #[error("query evaluation failed at {path}: {detail}")]
    QueryEvaluation { path: String, detail: String },

    /// The store is gone or shutting down
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Storage backend failures
    #[error("storage backend error: {0}")]
    Backend(String),
}
