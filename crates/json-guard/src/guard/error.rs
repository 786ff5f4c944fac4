use thiserror::Error;

use crate::document::PersistenceError;
use crate::json_patch::{PatchError, ValidationError};

/// Why a guarded patch was not (fully) applied.
#[derive(Debug, Error)]
pub enum GuardError {
    /// An operation targets a write-blacklisted path. Nothing was changed.
    #[error("Modifying {path} is not allowed.")]
    ProtectedField { path: String },

    /// A `test` operation failed against the unmodified document.
    #[error("The json-patch test op at index [{index}] has failed. No changes have been applied to the document.")]
    PreconditionFailed { index: usize },

    /// A forwarded operation failed during general application.
    #[error("operation [{index}] failed: {source}")]
    Apply {
        index: usize,
        #[source]
        source: PatchError,
    },

    #[error("invalid patch: {0}")]
    InvalidPatch(#[from] InvalidPatch),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Malformed wire input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidPatch {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] PatchError),
}

impl From<ValidationError> for GuardError {
    fn from(err: ValidationError) -> Self {
        GuardError::InvalidPatch(err.into())
    }
}
