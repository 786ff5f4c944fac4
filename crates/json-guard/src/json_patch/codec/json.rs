//! JSON codec for JSON Patch operations.
//!
//! Converts operations to/from `serde_json::Value` in RFC 6902 format:
//! `{"op": "...", "path": "/a/b", "value": ..., "from": "/x/y"}`.

use json_guard_pointer::{format_json_pointer, parse_json_pointer};
use serde_json::{json, Value};

use crate::json_patch::types::{Op, PatchError};

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_path(path: &[String]) -> Value {
    Value::String(format_json_pointer(path))
}

fn decode_path(v: &Value, field: &str) -> Result<Vec<String>, PatchError> {
    let s = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("'{field}' must be a string")))?;
    Ok(parse_json_pointer(s))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to a `serde_json::Value` in the JSON Patch format.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({
            "op": "add",
            "path": encode_path(path),
            "value": value
        }),
        Op::Remove { path } => json!({ "op": "remove", "path": encode_path(path) }),
        Op::Replace { path, value } => json!({
            "op": "replace",
            "path": encode_path(path),
            "value": value
        }),
        Op::Copy { path, from } => json!({
            "op": "copy",
            "path": encode_path(path),
            "from": encode_path(from)
        }),
        Op::Move { path, from } => json!({
            "op": "move",
            "path": encode_path(path),
            "from": encode_path(from)
        }),
        Op::Test { path, value } => json!({
            "op": "test",
            "path": encode_path(path),
            "value": value
        }),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a `serde_json::Value` into an `Op`.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;
    let path = decode_path(
        obj.get("path")
            .ok_or_else(|| PatchError::InvalidOp("missing 'path' field".into()))?,
        "path",
    )?;

    let value = |name: &str| -> Result<Value, PatchError> {
        obj.get("value")
            .cloned()
            .ok_or_else(|| PatchError::InvalidOp(format!("{name} requires 'value'")))
    };
    let from = |name: &str| -> Result<Vec<String>, PatchError> {
        let v = obj
            .get("from")
            .ok_or_else(|| PatchError::InvalidOp(format!("{name} requires 'from'")))?;
        decode_path(v, "from")
    };

    match op_str {
        "add" => Ok(Op::Add { path, value: value("add")? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: value("replace")? }),
        "copy" => Ok(Op::Copy { path, from: from("copy")? }),
        "move" => Ok(Op::Move { path, from: from("move")? }),
        "test" => Ok(Op::Test { path, value: value("test")? }),
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Deserialize a JSON array into a list of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}
