//! JSON Patch apply logic (RFC 6902).

use json_guard_pointer::{get, get_mut, is_valid_index};
use serde_json::Value;

use super::types::{Op, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

fn get_mut_at<'a>(doc: &'a mut Value, path: &[String]) -> Result<&'a mut Value, PatchError> {
    get_mut(doc, path).ok_or(PatchError::NotFound)
}

fn parse_index(key: &str) -> Result<usize, PatchError> {
    if !is_valid_index(key) {
        return Err(PatchError::InvalidIndex);
    }
    key.parse().map_err(|_| PatchError::InvalidIndex)
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match get_mut_at(doc, parent_path)? {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = parse_index(key)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Err(PatchError::InvalidTarget);
    };
    match get_mut_at(doc, parent_path)? {
        Value::Object(map) => map.shift_remove(key).ok_or(PatchError::NotFound),
        Value::Array(arr) => {
            let idx = parse_index(key)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound);
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let target = get_mut_at(doc, path)?;
    Ok(Some(std::mem::replace(target, value)))
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = get(doc, from).ok_or(PatchError::NotFound)?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    if path == from {
        return get(doc, from).map(|_| None).ok_or(PatchError::NotFound);
    }
    // A value cannot be moved into one of its own children.
    if path.len() > from.len() && path[..from.len()] == *from {
        return Err(PatchError::InvalidTarget);
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get(doc, path).ok_or(PatchError::NotFound)?;
    if actual == value {
        Ok(())
    } else {
        Err(PatchError::Test)
    }
}

// ── Main apply functions ──────────────────────────────────────────────────

/// Evaluate a `test` operation without touching the document.
///
/// Any other operation is rejected with `InvalidOp`.
pub fn test_op(doc: &Value, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Test { path, value } => apply_test(doc, path, value),
        other => Err(PatchError::InvalidOp(format!("{} is not a predicate", other.op_name()))),
    }
}

/// Apply a single operation to the document (in-place mutation).
///
/// Returns the value previously stored at the target path, if any.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Option<Value>, PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path } => apply_remove(doc, path).map(Some),
        Op::Replace { path, value } => apply_replace(doc, path, value.clone()),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value } => apply_test(doc, path, value).map(|_| None),
    }
}

/// Apply a sequence of operations, all or nothing.
///
/// The operations run against a copy of `doc`; the copy is returned only if
/// every operation succeeds. A failure carries the position of the failing
/// operation in `ops`.
pub fn apply_ops(doc: &Value, ops: &[Op]) -> Result<Value, (usize, PatchError)> {
    let mut working = doc.clone();
    for (i, op) in ops.iter().enumerate() {
        apply_op(&mut working, op).map_err(|e| (i, e))?;
    }
    Ok(working)
}

// ── Tests ─────────────────────────────────────────────────────────────────
