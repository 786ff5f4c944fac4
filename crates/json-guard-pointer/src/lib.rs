//! JSON Pointer (RFC 6901) and dot-path utilities.
//!
//! Document schemas name fields with dot paths (`user.auth.email`) while
//! JSON Patch operations address them with JSON Pointers
//! (`/user/auth/email`). This crate translates between the two forms and
//! provides the navigation and direct-edit helpers the patch guard builds on.
//!
//! # Example
//!
//! ```
//! use json_guard_pointer::{parse_json_pointer, format_json_pointer, get, to_pointer, to_dot_path};
//!
//! assert_eq!(to_pointer("user.auth.email"), "/user/auth/email");
//! assert_eq!(to_dot_path("/user/auth/email"), "user.auth.email");
//!
//! let path = parse_json_pointer("/foo/bar");
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/foo/bar");
//!
//! let doc = serde_json::json!({"foo": {"bar": 42}});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!(42)));
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod dot;
pub use dot::{format_dot_path, parse_dot_path, to_dot_path, to_pointer};

pub mod edit;
pub use edit::{set, unset};

pub mod types;
pub use types::{Path, PathStep};

pub mod validate;
pub use validate::{validate_dot_path, validate_json_pointer, ValidationError};

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// ```
/// use json_guard_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 before ~0, otherwise "~01" would decode to "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use json_guard_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into unescaped path components.
///
/// - Empty string is the root and returns an empty path
/// - The leading `/` is stripped
/// - Each component is unescaped
///
/// ```
/// use json_guard_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/"), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d"), vec!["a~b", "c/d"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    let rest = pointer.strip_prefix('/').unwrap_or(pointer);
    rest.split('/').map(unescape_component).collect()
}

/// Format path components into a JSON Pointer string.
///
/// Returns an empty string for the root path.
///
/// ```
/// use json_guard_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["foo".to_string(), "b/r".to_string()]), "/foo/b~1r");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if a string represents a valid non-negative integer array index.
///
/// ```
/// use json_guard_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Parse an array index step. `-` is not accepted here.
pub(crate) fn parse_index(step: &str) -> Result<usize, JsonPointerError> {
    if !is_valid_index(step) {
        return Err(JsonPointerError::InvalidIndex);
    }
    step.parse().map_err(|_| JsonPointerError::InvalidIndex)
}

/// Returns true if the value is an object or an array.
pub fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Get a value from a JSON document by path.
///
/// Returns `None` if the path doesn't exist. `-` never resolves.
///
/// ```
/// use json_guard_pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": [1, 2, 3]}});
/// assert_eq!(get(&doc, &["a".to_string(), "b".to_string(), "1".to_string()]), Some(&json!(2)));
/// assert_eq!(get(&doc, &["missing".to_string()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get(parse_index(step).ok()?)?,
            Value::Object(map) => map.get(step)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get_mut(parse_index(step).ok()?)?,
            Value::Object(map) => map.get_mut(step)?,
            _ => return None,
        };
    }
    Some(current)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("NOT_A_CONTAINER")]
    NotAContainer,
}
