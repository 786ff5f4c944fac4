//! Direct edits addressed by path.
//!
//! Unlike JSON Patch `add`/`remove`, these helpers are forgiving: `set`
//! creates missing intermediate objects and `unset` treats a missing path as
//! a no-op.

use serde_json::{Map, Value};

use crate::{parse_index, JsonPointerError};

/// Writes `value` at `path`, creating missing intermediate objects.
///
/// Object parents get the key inserted (or overwritten). Array parents get
/// the value inserted at the index, or appended for `-`. Returns the value
/// previously stored under an object key, if any.
///
/// # Errors
///
/// - `NotAContainer` if an existing intermediate value is a scalar
/// - `InvalidIndex` if an array step is not a valid index within bounds
///
/// ```
/// use json_guard_pointer::set;
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set(&mut doc, &["a".to_string(), "b".to_string()], json!(5)).unwrap();
/// assert_eq!(doc, json!({"a": {"b": 5}}));
/// ```
pub fn set(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, JsonPointerError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };

    let mut current = doc;
    for step in parents {
        current = match current {
            Value::Object(map) => map
                .entry(step.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(arr) => {
                let idx = parse_index(step)?;
                arr.get_mut(idx).ok_or(JsonPointerError::InvalidIndex)?
            }
            _ => return Err(JsonPointerError::NotAContainer),
        };
    }

    match current {
        Value::Object(map) => Ok(map.insert(last.clone(), value)),
        Value::Array(arr) => {
            if last == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = parse_index(last)?;
            if idx > arr.len() {
                return Err(JsonPointerError::InvalidIndex);
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(JsonPointerError::NotAContainer),
    }
}

/// Clears the value at `path` and returns it.
///
/// Object keys are removed. Array elements are replaced with `null` so the
/// positions of their siblings do not shift. Missing paths, and the root,
/// are left alone and return `None`.
///
/// ```
/// use json_guard_pointer::unset;
/// use serde_json::json;
///
/// let mut doc = json!({"a": 1, "b": [1, 2]});
/// assert_eq!(unset(&mut doc, &["a".to_string()]), Some(json!(1)));
/// assert_eq!(unset(&mut doc, &["b".to_string(), "0".to_string()]), Some(json!(1)));
/// assert_eq!(unset(&mut doc, &["zzz".to_string()]), None);
/// assert_eq!(doc, json!({"b": [null, 2]}));
/// ```
pub fn unset(doc: &mut Value, path: &[String]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    match crate::get_mut(doc, parents)? {
        Value::Object(map) => map.shift_remove(last),
        Value::Array(arr) => {
            let slot = arr.get_mut(parse_index(last).ok()?)?;
            Some(std::mem::replace(slot, Value::Null))
        }
        _ => None,
    }
}
