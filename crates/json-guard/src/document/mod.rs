//! Documents, sub-documents and their computed projection.

pub mod store;

use indexmap::IndexSet;
use json_guard_pointer::{get, get_mut, parse_dot_path, set, Path};
use serde_json::Value;
use thiserror::Error;

use crate::access::{Schema, ID_FIELD, VERSION_FIELD};
pub use store::{DocumentStore, InMemoryStore, PersistenceError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("no structured value at {0}")]
    NotASubDocument(String),
    #[error("sub-document {0} is no longer present in its owner")]
    Detached(String),
}

/// The mutable part of a document: its value and the dot paths modified
/// since the last save.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    pub value: Value,
    modified: IndexSet<String>,
}

impl DocumentState {
    pub fn new(value: Value) -> Self {
        Self { value, modified: IndexSet::new() }
    }

    pub fn mark_modified(&mut self, dot_path: impl Into<String>) {
        self.modified.insert(dot_path.into());
    }

    /// True if `dot_path`, one of its ancestors or one of its descendants
    /// was modified.
    pub fn is_modified(&self, dot_path: &str) -> bool {
        self.modified.iter().any(|m| {
            m == dot_path || is_dot_prefix(m, dot_path) || is_dot_prefix(dot_path, m)
        })
    }

    pub fn modified_paths(&self) -> impl Iterator<Item = &str> {
        self.modified.iter().map(String::as_str)
    }

    pub fn clear_modified(&mut self) {
        self.modified.clear();
    }
}

fn is_dot_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'.'
}

/// Something a patch can be applied to and then persisted.
pub trait Patchable {
    fn state(&self) -> &DocumentState;

    fn state_mut(&mut self) -> &mut DocumentState;

    /// The top-level document that owns this one, if it is nested.
    fn owner_document(&self) -> Option<&Document> {
        None
    }

    /// Where this value sits inside its owner. Empty for a top-level
    /// document.
    fn base_path(&self) -> &[String] {
        &[]
    }

    /// Saves through `store`. Nested documents save their owner.
    fn persist(&mut self, store: &mut dyn DocumentStore) -> Result<Value, PersistenceError>;
}

/// Options of [`Document::to_plain_object`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToObjectOptions {
    pub virtuals: bool,
    pub getters: bool,
}

impl ToObjectOptions {
    /// Virtuals and getters both materialized.
    pub fn computed() -> Self {
        Self { virtuals: true, getters: true }
    }
}

/// A top-level stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    state: DocumentState,
}

impl Document {
    pub fn new(value: Value) -> Self {
        Self { state: DocumentState::new(value) }
    }

    pub fn value(&self) -> &Value {
        &self.state.value
    }

    pub fn into_value(self) -> Value {
        self.state.value
    }

    pub fn id(&self) -> Option<&Value> {
        self.state.value.get(ID_FIELD)
    }

    pub fn version(&self) -> Option<u64> {
        self.state.value.get(VERSION_FIELD).and_then(Value::as_u64)
    }

    pub fn get(&self, dot_path: &str) -> Option<&Value> {
        get(&self.state.value, &parse_dot_path(dot_path))
    }

    pub fn is_modified(&self, dot_path: &str) -> bool {
        self.state.is_modified(dot_path)
    }

    /// Borrows the object or array at `dot_path` as a sub-document.
    pub fn subdocument(&mut self, dot_path: &str) -> Result<SubDocument<'_>, DocumentError> {
        let path = parse_dot_path(dot_path);
        let value = match get(&self.state.value, &path) {
            Some(v @ (Value::Object(_) | Value::Array(_))) if !path.is_empty() => v.clone(),
            _ => return Err(DocumentError::NotASubDocument(dot_path.to_string())),
        };
        Ok(SubDocument {
            owner: self,
            dot_path: dot_path.to_string(),
            path,
            state: DocumentState::new(value),
        })
    }

    /// Plain JSON of the document with getters applied to stored fields and
    /// virtual fields materialized.
    pub fn to_plain_object(&self, schema: &Schema, options: ToObjectOptions) -> Value {
        let mut out = self.state.value.clone();
        if options.getters {
            for (dot_path, def) in schema.fields() {
                let Some(getter) = &def.getter else { continue };
                if let Some(slot) = get_mut(&mut out, &parse_dot_path(dot_path)) {
                    *slot = getter(slot);
                }
            }
        }
        if options.virtuals {
            for (dot_path, def) in schema.virtuals() {
                let computed = (def.compute)(&self.state.value);
                if let Err(err) = set(&mut out, &parse_dot_path(dot_path), computed) {
                    tracing::debug!(path = dot_path, error = %err, "skipping virtual field");
                }
            }
        }
        out
    }
}

impl Patchable for Document {
    fn state(&self) -> &DocumentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DocumentState {
        &mut self.state
    }

    fn persist(&mut self, store: &mut dyn DocumentStore) -> Result<Value, PersistenceError> {
        let saved = store.save(self)?;
        self.state.value = saved.clone();
        self.state.clear_modified();
        Ok(saved)
    }
}

/// A structured value nested inside a [`Document`].
///
/// Patches apply to a detached copy; persisting writes the copy back into the
/// owner, marks the owner's matching paths modified and saves the owner.
#[derive(Debug)]
pub struct SubDocument<'a> {
    owner: &'a mut Document,
    dot_path: String,
    path: Path,
    state: DocumentState,
}

impl SubDocument<'_> {
    pub fn value(&self) -> &Value {
        &self.state.value
    }

    /// Location of this sub-document inside its owner.
    pub fn dot_path(&self) -> &str {
        &self.dot_path
    }

    fn write_back(&mut self) -> Result<(), PersistenceError> {
        let slot = get_mut(&mut self.owner.state.value, &self.path)
            .ok_or_else(|| PersistenceError::new(DocumentError::Detached(self.dot_path.clone())))?;
        *slot = self.state.value.clone();
        for m in self.state.modified_paths() {
            let owner_path = if m.is_empty() {
                self.dot_path.clone()
            } else {
                format!("{}.{}", self.dot_path, m)
            };
            self.owner.state.mark_modified(owner_path);
        }
        Ok(())
    }
}

impl Patchable for SubDocument<'_> {
    fn state(&self) -> &DocumentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DocumentState {
        &mut self.state
    }

    fn owner_document(&self) -> Option<&Document> {
        Some(&*self.owner)
    }

    fn base_path(&self) -> &[String] {
        &self.path
    }

    fn persist(&mut self, store: &mut dyn DocumentStore) -> Result<Value, PersistenceError> {
        self.write_back()?;
        let saved = self.owner.persist(store)?;
        if let Some(v) = get(&saved, &self.path) {
            self.state.value = v.clone();
        }
        self.state.clear_modified();
        Ok(saved)
    }
}
