//! Error types for the Accord engine.

use crate::{ConflictId, UserId};
use thiserror::Error;

/// All possible errors from the Accord engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("both edits belong to the same user: {0}")]
    SameEditor(UserId),

    #[error("unknown resolution strategy: {0}")]
    UnknownStrategy(String),

    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    // Resolution errors
    #[error("conflict already resolved: {0}")]
    AlreadyResolved(ConflictId),

    #[error("custom resolution for conflict {0} requires non-empty content")]
    MissingCustomContent(ConflictId),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
