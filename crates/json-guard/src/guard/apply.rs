//! Guarded patch application.
//!
//! A batch is applied in three passes:
//!
//! 1. every `test` operation is evaluated against the unmodified document;
//! 2. `remove` of a scalar or of an absent field, and `add` of a scalar
//!    value, are applied directly;
//! 3. the remaining operations are applied to a working copy that replaces
//!    the document only if all of them succeed.
//!
//! Effects of pass 2 survive a pass 3 failure unless
//! [`ApplyOptions::rollback_on_failure`] is set.

use json_guard_pointer::{format_dot_path, get, is_structured, set, unset};
use serde::{Deserialize, Serialize};

use crate::document::{DocumentState, Patchable};
use crate::json_patch::{apply_ops, test_op, Op, PatchError};

use super::GuardError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Restore the document as it was before pass 2 when pass 3 fails.
    pub rollback_on_failure: bool,
}

/// Applies `ops` to `target` in place. Write access must already have been
/// checked.
pub fn apply_guarded<T>(target: &mut T, ops: Vec<Op>, options: ApplyOptions) -> Result<(), GuardError>
where
    T: Patchable + ?Sized,
{
    check_preconditions(target.state(), &ops)?;

    let snapshot = options.rollback_on_failure.then(|| target.state().clone());
    let state = target.state_mut();
    let result = apply_shortcuts(state, ops).and_then(|forward| apply_forwarded(state, forward));
    if let Err(err) = &result {
        tracing::warn!(error = %err, "patch application failed");
        if let Some(snapshot) = snapshot {
            tracing::debug!("rolling back direct edits");
            *state = snapshot;
        }
    }
    result
}

// ── Pass 1 ────────────────────────────────────────────────────────────────

fn check_preconditions(state: &DocumentState, ops: &[Op]) -> Result<(), GuardError> {
    for (index, op) in ops.iter().enumerate().filter(|(_, op)| op.is_test()) {
        if let Err(err) = test_op(&state.value, op) {
            tracing::warn!(index, path = %op.pointer(), error = %err, "patch precondition failed");
            return Err(GuardError::PreconditionFailed { index });
        }
    }
    Ok(())
}

// ── Pass 2 ────────────────────────────────────────────────────────────────

/// Operations left for pass 3, with their index in the caller's batch.
#[derive(Debug, Default)]
struct Forwarded {
    indices: Vec<usize>,
    ops: Vec<Op>,
}

/// Applies the scalar shortcuts and returns the remaining operations.
/// `test` operations are dropped. Removing an absent field is a no-op.
fn apply_shortcuts(state: &mut DocumentState, ops: Vec<Op>) -> Result<Forwarded, GuardError> {
    let mut forward = Forwarded::default();
    let mut direct = 0usize;
    for (index, op) in ops.into_iter().enumerate() {
        match op {
            Op::Test { .. } => {}
            Op::Remove { path } if !get(&state.value, &path).is_some_and(is_structured) => {
                if unset(&mut state.value, &path).is_some() {
                    state.mark_modified(format_dot_path(&path));
                }
                direct += 1;
            }
            Op::Add { path, value } if !is_structured(&value) => {
                set(&mut state.value, &path, value).map_err(|err| GuardError::Apply {
                    index,
                    source: PatchError::from(err),
                })?;
                state.mark_modified(format_dot_path(&path));
                direct += 1;
            }
            op => {
                forward.indices.push(index);
                forward.ops.push(op);
            }
        }
    }
    tracing::debug!(direct, forwarded = forward.ops.len(), "applied scalar shortcuts");
    Ok(forward)
}

// ── Pass 3 ────────────────────────────────────────────────────────────────

fn apply_forwarded(state: &mut DocumentState, forward: Forwarded) -> Result<(), GuardError> {
    if forward.ops.is_empty() {
        return Ok(());
    }
    state.value = apply_ops(&state.value, &forward.ops).map_err(|(pos, source)| {
        GuardError::Apply { index: forward.indices[pos], source }
    })?;
    for op in &forward.ops {
        state.mark_modified(op.dot_path());
        if let Op::Move { from, .. } = op {
            state.mark_modified(format_dot_path(from));
        }
    }
    tracing::debug!(applied = forward.ops.len(), "applied forwarded operations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::json_patch::from_json_patch;
    use serde_json::{json, Value};

    fn ops(v: Value) -> Vec<Op> {
        from_json_patch(&v).unwrap()
    }

    fn modified(doc: &Document) -> Vec<String> {
        doc.state().modified_paths().map(str::to_string).collect()
    }

    #[test]
    fn failed_test_leaves_document_untouched() {
        let mut doc = Document::new(json!({"a": 1, "b": 2}));
        let patch = ops(json!([
            {"op": "replace", "path": "/b", "value": 3},
            {"op": "test", "path": "/a", "value": 5}
        ]));
        let err = apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, GuardError::PreconditionFailed { index: 1 }));
        assert_eq!(doc.value(), &json!({"a": 1, "b": 2}));
        assert!(modified(&doc).is_empty());
    }

    #[test]
    fn test_on_missing_path_fails() {
        let mut doc = Document::new(json!({}));
        let patch = ops(json!([{"op": "test", "path": "/a", "value": null}]));
        let err = apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, GuardError::PreconditionFailed { index: 0 }));
    }

    #[test]
    fn tests_see_unmodified_document() {
        let mut doc = Document::new(json!({"a": 1}));
        let patch = ops(json!([
            {"op": "replace", "path": "/a", "value": 2},
            {"op": "test", "path": "/a", "value": 1}
        ]));
        apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"a": 2}));
    }

    #[test]
    fn scalar_remove_unsets_field() {
        let mut doc = Document::new(json!({"nickname": "bob", "tags": ["x", "y"]}));
        let patch = ops(json!([
            {"op": "remove", "path": "/nickname"},
            {"op": "remove", "path": "/tags/0"}
        ]));
        apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"tags": [null, "y"]}));
        assert_eq!(modified(&doc), vec!["nickname", "tags.0"]);
    }

    #[test]
    fn remove_of_absent_field_succeeds() {
        let mut doc = Document::new(json!({"_id": "1", "name": "x"}));
        let patch = ops(json!([
            {"op": "remove", "path": "/x"},
            {"op": "remove", "path": "/name/first"},
            {"op": "remove", "path": "/deep/er/path"}
        ]));
        apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"_id": "1", "name": "x"}));
        assert!(modified(&doc).is_empty());
    }

    #[test]
    fn structured_remove_is_forwarded() {
        let mut doc = Document::new(json!({"address": {"city": "Oslo"}, "tags": [[1], [2]]}));
        let patch = ops(json!([
            {"op": "remove", "path": "/address"},
            {"op": "remove", "path": "/tags/0"}
        ]));
        apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"tags": [[2]]}));
    }

    #[test]
    fn scalar_add_sets_field() {
        let mut doc = Document::new(json!({"tags": ["a"]}));
        let patch = ops(json!([
            {"op": "add", "path": "/profile/age", "value": 30},
            {"op": "add", "path": "/tags/-", "value": "b"},
            {"op": "add", "path": "/tags/0", "value": "z"}
        ]));
        apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"tags": ["z", "a", "b"], "profile": {"age": 30}}));
        assert!(doc.is_modified("profile.age"));
    }

    #[test]
    fn scalar_add_into_scalar_fails_with_index() {
        let mut doc = Document::new(json!({"name": "x"}));
        let patch = ops(json!([
            {"op": "test", "path": "/name", "value": "x"},
            {"op": "add", "path": "/name/first", "value": "y"}
        ]));
        let err = apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GuardError::Apply { index: 1, source: PatchError::InvalidTarget }
        ));
    }

    #[test]
    fn forwarded_ops_are_atomic() {
        let mut doc = Document::new(json!({"a": {"x": 1}, "b": 1}));
        let patch = ops(json!([
            {"op": "replace", "path": "/a", "value": {"x": 2}},
            {"op": "copy", "from": "/missing", "path": "/c"}
        ]));
        let err = apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, GuardError::Apply { index: 1, source: PatchError::NotFound }));
        assert_eq!(doc.value(), &json!({"a": {"x": 1}, "b": 1}));
    }

    #[test]
    fn direct_edits_survive_forwarded_failure_by_default() {
        let mut doc = Document::new(json!({"a": 1, "b": 2}));
        let patch = ops(json!([
            {"op": "remove", "path": "/a"},
            {"op": "replace", "path": "/missing", "value": {}}
        ]));
        assert!(apply_guarded(&mut doc, patch, ApplyOptions::default()).is_err());
        assert_eq!(doc.value(), &json!({"b": 2}));
        assert!(doc.is_modified("a"));
    }

    #[test]
    fn rollback_restores_direct_edits() {
        let mut doc = Document::new(json!({"a": 1, "b": 2}));
        let patch = ops(json!([
            {"op": "remove", "path": "/a"},
            {"op": "add", "path": "/c", "value": true},
            {"op": "replace", "path": "/missing", "value": {}}
        ]));
        let options = ApplyOptions { rollback_on_failure: true };
        assert!(apply_guarded(&mut doc, patch, options).is_err());
        assert_eq!(doc.value(), &json!({"a": 1, "b": 2}));
        assert!(modified(&doc).is_empty());
    }

    #[test]
    fn move_marks_both_ends() {
        let mut doc = Document::new(json!({"a": {"x": 1}}));
        let patch = ops(json!([{"op": "move", "from": "/a", "path": "/b"}]));
        apply_guarded(&mut doc, patch, ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"b": {"x": 1}}));
        assert_eq!(modified(&doc), vec!["b", "a"]);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut doc = Document::new(json!({"a": 1}));
        apply_guarded(&mut doc, Vec::new(), ApplyOptions::default()).unwrap();
        assert_eq!(doc.value(), &json!({"a": 1}));
    }
}
