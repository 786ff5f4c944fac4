//! Read filtering of document projections.

use json_guard_pointer::{parse_dot_path, unset};
use serde_json::Value;

use crate::access::Blacklist;

/// Removes every read-blacklisted path, and every path in `extra`, from
/// `projection`. Paths that are absent are skipped.
pub fn filter_protected(mut projection: Value, read: &Blacklist, extra: &[&str]) -> Value {
    for dot_path in read.iter().chain(extra.iter().copied()) {
        let path = parse_dot_path(dot_path);
        if path.is_empty() {
            continue;
        }
        unset(&mut projection, &path);
    }
    projection
}

/// [`filter_protected`] over a collection, preserving order.
pub fn filter_protected_all<I>(projections: I, read: &Blacklist, extra: &[&str]) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    projections
        .into_iter()
        .map(|p| filter_protected(p, read, extra))
        .collect()
}
