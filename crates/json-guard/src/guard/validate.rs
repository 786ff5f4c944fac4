//! Write-access check run before any mutation.

use json_guard_pointer::format_json_pointer;

use crate::access::Blacklist;
use crate::json_patch::Op;

use super::GuardError;

/// Rejects `ops` if any operation's `path`, taken relative to `base`, is
/// exactly a write-blacklisted path. `base` is where the patched value sits
/// in its owner document (empty for a top-level document).
///
/// Paths are compared field name by field name, so names containing `~` or
/// `/` match however the pointer escaped them. Blacklisted paths are checked
/// in blacklist order; the first hit wins. `from` paths are not checked.
pub fn check_write_access(write: &Blacklist, base: &[String], ops: &[Op]) -> Result<(), GuardError> {
    for protected in write.paths() {
        let Some(rest) = protected.strip_prefix(base) else { continue };
        if ops.iter().any(|op| op.path().as_slice() == rest) {
            let path = format_json_pointer(&protected);
            tracing::warn!(path = %path, "patch targets a write-protected field");
            return Err(GuardError::ProtectedField { path });
        }
    }
    Ok(())
}
