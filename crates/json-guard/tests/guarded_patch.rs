mod common;

use json_guard::json_patch::from_json_patch;
use json_guard::{
    AccessConfig, ApplyOptions, Document, GuardError, InMemoryStore, Model, Patchable, PatchError,
    Schema,
};
use serde_json::{json, Value};

use common::{user, user_model, user_schema};

fn patch(
    model: &Model,
    doc: &mut Document,
    store: &mut InMemoryStore,
    ops: Value,
) -> Result<Value, GuardError> {
    model.patch_json(doc, &ops, store)
}

// ── Write protection ──────────────────────────────────────────────────────

#[test]
fn protected_field_rejects_whole_batch() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));
    let before = doc.value().clone();

    let err = patch(
        &model,
        &mut doc,
        &mut store,
        json!([
            {"op": "replace", "path": "/name", "value": "Bob"},
            {"op": "replace", "path": "/role", "value": "admin"}
        ]),
    )
    .unwrap_err();

    assert!(matches!(&err, GuardError::ProtectedField { path } if path == "/role"));
    assert_eq!(doc.value(), &before);
    assert!(store.is_empty());
}

#[test]
fn identity_and_version_are_protected_by_default() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    for path in ["/_id", "/__v"] {
        let mut doc = Document::new(user("u1"));
        let err = patch(&model, &mut doc, &mut store, json!([{"op": "remove", "path": path}]))
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Modifying {path} is not allowed."));
    }
}

#[test]
fn nested_protected_field_matches_exactly() {
    let model = user_model();
    let mut store = InMemoryStore::new();

    let mut doc = Document::new(user("u1"));
    let err = patch(
        &model,
        &mut doc,
        &mut store,
        json!([{"op": "replace", "path": "/auth/token", "value": "x"}]),
    )
    .unwrap_err();
    assert!(matches!(err, GuardError::ProtectedField { .. }));

    // The parent object is not itself protected.
    let out = patch(
        &model,
        &mut doc,
        &mut store,
        json!([{"op": "replace", "path": "/auth", "value": {"kind": "oauth"}}]),
    )
    .unwrap();
    assert_eq!(out["auth"], json!({"kind": "oauth"}));
}

#[test]
fn field_names_with_tilde_are_protected() {
    let schema = Schema::from_metadata_json(&json!({"a~b": {"writable": false}})).unwrap();
    let model = Model::register("Odd", schema, &AccessConfig::default());
    let mut store = InMemoryStore::new();

    for pointer in ["/a~0b", "/a~b"] {
        let mut doc = Document::new(json!({"_id": "1", "a~b": "kept"}));
        let err = patch(
            &model,
            &mut doc,
            &mut store,
            json!([{"op": "replace", "path": pointer, "value": "changed"}]),
        )
        .unwrap_err();
        assert!(matches!(&err, GuardError::ProtectedField { path } if path == "/a~0b"));
        assert_eq!(doc.value()["a~b"], json!("kept"));
    }
    assert!(store.is_empty());
}

#[test]
fn global_write_blacklist_comes_from_config() {
    let config = AccessConfig::from_toml_str(r#"global_write_blacklist = ["email"]"#).unwrap();
    let model = Model::register("User", user_schema(), &config);
    let mut store = InMemoryStore::new();

    let mut doc = Document::new(user("u1"));
    let err = patch(
        &model,
        &mut doc,
        &mut store,
        json!([{"op": "replace", "path": "/email", "value": "x"}]),
    )
    .unwrap_err();
    assert!(matches!(err, GuardError::ProtectedField { .. }));

    // `_id` is only protected by the default list, which this config replaces.
    assert!(!model.write_blacklist().contains("_id"));
}

// ── Preconditions ─────────────────────────────────────────────────────────

#[test]
fn failed_test_changes_nothing() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));
    let before = doc.value().clone();

    let err = patch(
        &model,
        &mut doc,
        &mut store,
        json!([
            {"op": "remove", "path": "/email"},
            {"op": "test", "path": "/name", "value": "Grace"},
            {"op": "replace", "path": "/address/city", "value": "Bergen"}
        ]),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "The json-patch test op at index [1] has failed. No changes have been applied to the document."
    );
    assert_eq!(doc.value(), &before);
    assert!(store.is_empty());
}

#[test]
fn passing_test_allows_batch() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    let out = patch(
        &model,
        &mut doc,
        &mut store,
        json!([
            {"op": "test", "path": "/address/city", "value": "Oslo"},
            {"op": "replace", "path": "/address/city", "value": "Bergen"}
        ]),
    )
    .unwrap();
    assert_eq!(out["address"]["city"], json!("Bergen"));
    assert_eq!(out["__v"], json!(1));
}

// ── Scalar shortcuts ──────────────────────────────────────────────────────

#[test]
fn scalar_remove_unsets_and_persists() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    let out = patch(&model, &mut doc, &mut store, json!([{"op": "remove", "path": "/email"}])).unwrap();

    assert!(out.get("email").is_none());
    assert_eq!(store.get("u1").and_then(|v| v.get("email")), None);
    assert_eq!(store.save_log(), ["u1"]);
}

#[test]
fn remove_of_absent_field_is_a_no_op() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(json!({"_id": "1"}));

    let out = patch(&model, &mut doc, &mut store, json!([{"op": "remove", "path": "/x"}])).unwrap();

    assert_eq!(out, json!({"_id": "1", "__v": 0}));
    assert_eq!(store.save_log(), ["1"]);
}

#[test]
fn scalar_add_sets_and_persists() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    let out = patch(
        &model,
        &mut doc,
        &mut store,
        json!([{"op": "add", "path": "/nickname", "value": "ada"}]),
    )
    .unwrap();

    assert_eq!(out["nickname"], json!("ada"));
    assert_eq!(store.get("u1").unwrap()["nickname"], json!("ada"));
}

#[test]
fn structured_add_uses_rfc_semantics() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    // RFC 6902 `add` requires the parent to exist.
    let err = patch(
        &model,
        &mut doc,
        &mut store,
        json!([{"op": "add", "path": "/profile/links", "value": []}]),
    )
    .unwrap_err();
    assert!(matches!(err, GuardError::Apply { index: 0, source: PatchError::NotFound }));
}

// ── Partial application ───────────────────────────────────────────────────

fn failing_batch() -> Value {
    json!([
        {"op": "remove", "path": "/email"},
        {"op": "replace", "path": "/address", "value": {"city": "Bergen"}},
        {"op": "move", "from": "/missing", "path": "/elsewhere"}
    ])
}

#[test]
fn direct_edits_survive_general_failure() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    let err = patch(&model, &mut doc, &mut store, failing_batch()).unwrap_err();

    assert!(matches!(err, GuardError::Apply { index: 2, source: PatchError::NotFound }));
    assert!(doc.value().get("email").is_none());
    assert_eq!(doc.value()["address"], json!({"city": "Oslo", "zip": "0150"}));
    assert!(store.is_empty());
}

#[test]
fn rollback_restores_document() {
    let config = AccessConfig::from_toml_str("[apply]\nrollback_on_failure = true").unwrap();
    let model = Model::register("User", user_schema(), &config);
    assert_eq!(model.apply_options(), ApplyOptions { rollback_on_failure: true });
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    assert!(patch(&model, &mut doc, &mut store, failing_batch()).is_err());
    assert_eq!(doc.value(), &user("u1"));
    assert_eq!(doc.state().modified_paths().count(), 0);
}

// ── Typed operations ──────────────────────────────────────────────────────

#[test]
fn typed_ops_go_through_the_same_checks() {
    let model = user_model();
    let mut store = InMemoryStore::new();
    let mut doc = Document::new(user("u1"));

    let ops = from_json_patch(&json!([
        {"op": "copy", "from": "/name", "path": "/alias"},
        {"op": "add", "path": "/tags/-", "value": "c"}
    ]))
    .unwrap();
    let out = model.patch(&mut doc, ops, &mut store).unwrap();
    assert_eq!(out["alias"], json!("Ada"));
    assert_eq!(out["tags"], json!(["a", "b", "c"]));
}
