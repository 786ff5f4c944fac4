//! Syntax checks for pointers and dot paths.

use thiserror::Error;

const MAX_POINTER_LENGTH: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("POINTER_INVALID")]
    PointerInvalid,
    #[error("POINTER_TOO_LONG")]
    PointerTooLong,
    #[error("DOT_PATH_EMPTY")]
    DotPathEmpty,
    #[error("DOT_PATH_EMPTY_SEGMENT")]
    DotPathEmptySegment,
    #[error("DOT_PATH_SLASH")]
    DotPathSlash,
}

/// Checks that `pointer` is the root (`""`) or starts with `/`, and is at
/// most 1024 bytes long.
///
/// ```
/// use json_guard_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), ValidationError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(ValidationError::PointerInvalid);
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(ValidationError::PointerTooLong);
    }
    Ok(())
}

/// Checks that `dot_path` names a field: non-empty, no empty segments and no
/// `/`. Paths that pass translate to a pointer and back unchanged.
///
/// ```
/// use json_guard_pointer::validate_dot_path;
///
/// validate_dot_path("user.auth.email").unwrap();
/// validate_dot_path("user..email").unwrap_err();
/// validate_dot_path("a/b").unwrap_err();
/// ```
pub fn validate_dot_path(dot_path: &str) -> Result<(), ValidationError> {
    if dot_path.is_empty() {
        return Err(ValidationError::DotPathEmpty);
    }
    if dot_path.contains('/') {
        return Err(ValidationError::DotPathSlash);
    }
    if dot_path.split('.').any(str::is_empty) {
        return Err(ValidationError::DotPathEmptySegment);
    }
    Ok(())
}
