//! Persistence boundary.

use std::error::Error as StdError;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use super::Document;
use crate::access::VERSION_FIELD;

/// Opaque failure reported by a [`DocumentStore`], passed through unchanged.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct PersistenceError(Box<dyn StdError + Send + Sync>);

impl PersistenceError {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(err.into())
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

/// Saves top-level documents.
pub trait DocumentStore {
    /// Persists `document` and returns the stored representation.
    fn save(&mut self, document: &Document) -> Result<Value, PersistenceError>;
}

impl<F> DocumentStore for F
where
    F: FnMut(&Document) -> Result<Value, PersistenceError>,
{
    fn save(&mut self, document: &Document) -> Result<Value, PersistenceError> {
        self(document)
    }
}

/// A store keeping documents in memory, keyed by their `_id`.
///
/// Every save bumps `__v`, starting at 0 for documents that have none.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    documents: IndexMap<String, Value>,
    saves: Vec<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids of every saved document, in save order.
    pub fn save_log(&self) -> &[String] {
        &self.saves
    }
}

fn key_of(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl DocumentStore for InMemoryStore {
    fn save(&mut self, document: &Document) -> Result<Value, PersistenceError> {
        let id = document
            .id()
            .ok_or_else(|| PersistenceError::new("document has no _id"))?;
        let key = key_of(id);
        let mut saved = document.value().clone();
        if let Value::Object(map) = &mut saved {
            let next = match document.version() {
                Some(v) => v + 1,
                None => 0,
            };
            map.insert(VERSION_FIELD.to_string(), Value::from(next));
        }
        tracing::debug!(id = %key, version = ?saved.get(VERSION_FIELD), "saving document");
        self.documents.insert(key.clone(), saved.clone());
        self.saves.push(key);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn saves_by_id() {
        let mut store = InMemoryStore::new();
        store.save(&Document::new(json!({"_id": "a", "x": 1}))).unwrap();
        store.save(&Document::new(json!({"_id": 7, "x": 2}))).unwrap();
        store.save(&Document::new(json!({"_id": "a", "x": 3}))).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), Some(&json!({"_id": "a", "x": 3, "__v": 0})));
        assert_eq!(store.get("7"), Some(&json!({"_id": 7, "x": 2, "__v": 0})));
        assert_eq!(store.save_log(), ["a", "7", "a"]);
    }

    #[test]
    fn bumps_version() {
        let mut store = InMemoryStore::new();
        let saved = store.save(&Document::new(json!({"_id": "a", "__v": 4}))).unwrap();
        assert_eq!(saved["__v"], json!(5));
    }

    #[test]
    fn rejects_document_without_id() {
        let mut store = InMemoryStore::new();
        let err = store.save(&Document::new(json!({"x": 1}))).unwrap_err();
        assert_eq!(err.to_string(), "document has no _id");
        assert!(store.is_empty());
    }

    #[test]
    fn closures_are_stores() {
        let mut calls = 0;
        let mut store = |doc: &Document| -> Result<Value, PersistenceError> {
            calls += 1;
            Ok(doc.value().clone())
        };
        store.save(&Document::new(json!({}))).unwrap();
        assert_eq!(calls, 1);
    }
}
