//! json-guard - JSON Patch (RFC 6902) with field-level access control.
//!
//! A [`Model`] is registered once per document type from a [`Schema`] of
//! field metadata. It rejects patches that target write-protected fields,
//! evaluates `test` preconditions before touching the document, applies the
//! batch and hands the result to a [`DocumentStore`]. On the read side it
//! strips read-protected fields from the computed projection of a document.
//!
//! ```
//! use json_guard::{AccessConfig, Document, FieldMetadata, InMemoryStore, Model, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .field("password", FieldMetadata::hidden())
//!     .field("role", FieldMetadata::read_only())
//!     .build();
//! let users = Model::register("User", schema, &AccessConfig::default());
//!
//! let mut store = InMemoryStore::new();
//! let mut doc = Document::new(json!({"_id": "u1", "name": "a", "password": "p", "role": "user"}));
//!
//! let patch = json!([{"op": "replace", "path": "/role", "value": "admin"}]);
//! assert!(users.patch_json(&mut doc, &patch, &mut store).is_err());
//!
//! let patch = json!([{"op": "replace", "path": "/name", "value": "b"}]);
//! users.patch_json(&mut doc, &patch, &mut store).unwrap();
//! assert_eq!(
//!     users.filter_protected(&doc, &["_id", "__v"]),
//!     json!({"name": "b", "role": "user"})
//! );
//! ```

pub mod access;
pub mod document;
pub mod filter;
pub mod guard;
pub mod json_cli;
pub mod json_patch;
pub mod model;

pub use access::{AccessConfig, AccessConfigError, AccessPolicy, Blacklist, FieldMetadata, Schema};
pub use document::{
    Document, DocumentState, DocumentStore, InMemoryStore, Patchable, PersistenceError,
    SubDocument, ToObjectOptions,
};
pub use guard::{ApplyOptions, GuardError, InvalidPatch};
pub use json_patch::{Op, PatchError};
pub use model::Model;
