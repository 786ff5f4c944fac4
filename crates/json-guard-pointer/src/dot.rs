//! Dot-path notation.
//!
//! Schemas declare field metadata with dot paths (`a.b.c`). These helpers
//! convert them to and from JSON Pointer text without escaping: a segment
//! name containing a literal `.` or `/` does not survive the round trip.

use crate::types::Path;

/// Converts a dot path into JSON Pointer text.
///
/// ```
/// use json_guard_pointer::to_pointer;
///
/// assert_eq!(to_pointer("user.authLocal.email"), "/user/authLocal/email");
/// assert_eq!(to_pointer("_id"), "/_id");
/// ```
pub fn to_pointer(dot_path: &str) -> String {
    let mut out = String::with_capacity(dot_path.len() + 1);
    out.push('/');
    out.push_str(&dot_path.replace('.', "/"));
    out
}

/// Converts JSON Pointer text into a dot path.
///
/// The pointer is expected to start with `/`; anything else only has its
/// separators replaced.
///
/// ```
/// use json_guard_pointer::to_dot_path;
///
/// assert_eq!(to_dot_path("/user/authLocal/email"), "user.authLocal.email");
/// ```
pub fn to_dot_path(pointer: &str) -> String {
    pointer
        .strip_prefix('/')
        .unwrap_or(pointer)
        .replace('/', ".")
}

/// Splits a dot path into path components. The empty string is the root.
///
/// ```
/// use json_guard_pointer::parse_dot_path;
///
/// assert_eq!(parse_dot_path("a.0.b"), vec!["a", "0", "b"]);
/// assert!(parse_dot_path("").is_empty());
/// ```
pub fn parse_dot_path(dot_path: &str) -> Path {
    if dot_path.is_empty() {
        return Vec::new();
    }
    dot_path.split('.').map(str::to_string).collect()
}

/// Joins path components into a dot path.
pub fn format_dot_path(path: &[String]) -> String {
    path.join(".")
}
