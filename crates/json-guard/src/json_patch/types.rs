//! Core types for the JSON Patch module.

use serde_json::Value;
use thiserror::Error;

use json_guard_pointer::{format_dot_path, format_json_pointer, JsonPointerError};
pub use json_guard_pointer::Path;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("TEST")]
    Test,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl From<JsonPointerError> for PatchError {
    fn from(err: JsonPointerError) -> Self {
        match err {
            JsonPointerError::InvalidIndex => PatchError::InvalidIndex,
            JsonPointerError::NotAContainer => PatchError::InvalidTarget,
        }
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch (RFC 6902) operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl Op {
    /// Returns the wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Copy { .. } => "copy",
            Op::Move { .. } => "move",
            Op::Test { .. } => "test",
        }
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Copy { path, .. }
            | Op::Move { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Returns the source path of `copy` and `move`.
    pub fn from_path(&self) -> Option<&Path> {
        match self {
            Op::Copy { from, .. } | Op::Move { from, .. } => Some(from),
            _ => None,
        }
    }

    /// The target path as JSON Pointer text.
    pub fn pointer(&self) -> String {
        format_json_pointer(self.path())
    }

    /// The target path in dot notation.
    pub fn dot_path(&self) -> String {
        format_dot_path(self.path())
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Op::Test { .. })
    }
}
