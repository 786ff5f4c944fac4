//! JSON Patch operation validator.
//!
//! Validates raw JSON Patch operations (as `serde_json::Value` maps) before
//! decoding, so untrusted input is rejected with a precise message.

use json_guard_pointer::validate_json_pointer;
use serde_json::{Map, Value};

// ── Error ──────────────────────────────────────────────────────────────────

/// Error returned by validation functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ValidationError {}

fn err(msg: &str) -> ValidationError {
    ValidationError(msg.to_string())
}

// ── Public API ─────────────────────────────────────────────────────────────

/// Validate a list of operations.
///
/// Errors include the index of the failing operation:
/// `"Error in operation [index = N] (reason)."`. An empty list is valid.
pub fn validate_operations(ops: &Value) -> Result<(), ValidationError> {
    let arr = ops.as_array().ok_or_else(|| err("Not a array."))?;
    for (i, op) in arr.iter().enumerate() {
        validate_operation(op).map_err(|e| {
            ValidationError(format!("Error in operation [index = {}] ({}).", i, e.0))
        })?;
    }
    Ok(())
}

/// Validate a single operation object.
pub fn validate_operation(op: &Value) -> Result<(), ValidationError> {
    let map = op.as_object().ok_or_else(|| err("OP_INVALID"))?;

    let path_str = map
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err("OP_PATH_INVALID"))?;
    validate_pointer(path_str)?;

    let op_name = map.get("op").and_then(|v| v.as_str()).unwrap_or("");
    match op_name {
        "add" | "replace" | "test" => validate_has_value(map),
        "remove" => Ok(()),
        "copy" => validate_from(map).map(|_| ()),
        "move" => validate_op_move(map, path_str),
        _ => Err(err("OP_UNKNOWN")),
    }
}

// ── Operation-specific validators ─────────────────────────────────────────

fn validate_op_move(map: &Map<String, Value>, path_str: &str) -> Result<(), ValidationError> {
    let from_str = validate_from(map)?;
    let prefix = format!("{}/", from_str);
    if path_str.starts_with(&prefix) {
        return Err(err("Cannot move into own children."));
    }
    Ok(())
}

fn validate_from(map: &Map<String, Value>) -> Result<&str, ValidationError> {
    let from = map
        .get("from")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err("OP_FROM_INVALID"))?;
    validate_pointer(from)?;
    Ok(from)
}

fn validate_has_value(map: &Map<String, Value>) -> Result<(), ValidationError> {
    if !map.contains_key("value") {
        return Err(err("OP_VALUE_MISSING"));
    }
    Ok(())
}

fn validate_pointer(pointer: &str) -> Result<(), ValidationError> {
    validate_json_pointer(pointer).map_err(|e| ValidationError(e.to_string()))
}
