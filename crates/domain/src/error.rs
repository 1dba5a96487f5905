//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LightkeeperError`] via `#[from]`.

/// Top-level error returned by every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum LightkeeperError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("duplicate")]
    Duplicate(#[from] DuplicateError),

    /// Failure inside a storage adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The command dispatcher could not deliver a command to a device.
    #[error("dispatch error")]
    Dispatch(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated by caller-supplied data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("identifier must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("brightness {0} is outside 0..=100")]
    BrightnessOutOfRange(i64),

    #[error("event start is required")]
    MissingStart,

    #[error("event start must be strictly before its end")]
    InvalidInterval,

    #[error("manual override is set without a manual action timestamp")]
    OverrideWithoutTimestamp,
}

/// The requested record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A record with the same identifier already exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} already exists")]
pub struct DuplicateError {
    pub entity: &'static str,
    pub id: String,
}
