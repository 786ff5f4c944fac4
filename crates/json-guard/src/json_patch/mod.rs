//! JSON Patch implementation (RFC 6902).
//!
//! All standard operations are supported:
//! `add`, `remove`, `replace`, `copy`, `move`, `test`.

pub mod types;
pub mod apply;
pub mod codec;
pub mod validate;

pub use types::{Op, PatchError, Path};
pub use apply::{apply_op, apply_ops, test_op};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use validate::{validate_operations, ValidationError};
