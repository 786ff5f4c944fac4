//! Field metadata declared per document type.
//!
//! A [`Schema`] is an ordered table from dot path to [`FieldDef`], plus the
//! virtual fields computed from a whole document. It is built once when the
//! document type is registered and never changes afterwards.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use json_guard_pointer::{validate_dot_path, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Read/write flags of one field. Both default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMetadata {
    pub readable: bool,
    pub writable: bool,
}

impl Default for FieldMetadata {
    fn default() -> Self {
        Self { readable: true, writable: true }
    }
}

impl FieldMetadata {
    /// Never returned to consumers.
    pub fn hidden() -> Self {
        Self { readable: false, writable: true }
    }

    /// Visible but not patchable.
    pub fn read_only() -> Self {
        Self { readable: true, writable: false }
    }

    /// Neither visible nor patchable.
    pub fn private() -> Self {
        Self { readable: false, writable: false }
    }
}

/// Transforms a stored value into its presented form.
pub type Getter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Computes a derived value from the whole stored document.
pub type Compute = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

#[derive(Clone, Default)]
pub struct FieldDef {
    pub metadata: FieldMetadata,
    pub getter: Option<Getter>,
}

#[derive(Clone)]
pub struct VirtualDef {
    pub metadata: FieldMetadata,
    pub compute: Compute,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema metadata must be an object of field paths")]
    NotAnObject,
    #[error("invalid field path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: ValidationError,
    },
    #[error("invalid metadata for field {path}: {source}")]
    InvalidField {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldDef>,
    virtuals: IndexMap<String, VirtualDef>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Builds a schema from a metadata map such as
    /// `{"password": {"readable": false}, "role": {"writable": false}}`.
    pub fn from_metadata_json(metadata: &Value) -> Result<Self, SchemaError> {
        let map = metadata.as_object().ok_or(SchemaError::NotAnObject)?;
        let mut builder = Schema::builder();
        for (path, raw) in map {
            validate_dot_path(path).map_err(|source| SchemaError::InvalidPath {
                path: path.clone(),
                source,
            })?;
            let meta: FieldMetadata = serde_json::from_value(raw.clone()).map_err(|source| {
                SchemaError::InvalidField { path: path.clone(), source }
            })?;
            builder = builder.field(path, meta);
        }
        Ok(builder.build())
    }

    pub fn field(&self, path: &str) -> Option<&FieldDef> {
        self.fields.get(path)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn virtuals(&self) -> impl Iterator<Item = (&str, &VirtualDef)> {
        self.virtuals.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every declared path with its flags: stored fields first, then
    /// virtuals, each in declaration order.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, FieldMetadata)> {
        self.fields
            .iter()
            .map(|(k, f)| (k.as_str(), f.metadata))
            .chain(self.virtuals.iter().map(|(k, v)| (k.as_str(), v.metadata)))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: IndexMap<&str, FieldMetadata> =
            self.fields.iter().map(|(k, v)| (k.as_str(), v.metadata)).collect();
        let virtuals: IndexMap<&str, FieldMetadata> =
            self.virtuals.iter().map(|(k, v)| (k.as_str(), v.metadata)).collect();
        f.debug_struct("Schema")
            .field("fields", &fields)
            .field("virtuals", &virtuals)
            .finish()
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Declares a stored field. Declaring the same path twice keeps the
    /// first position and the last metadata.
    pub fn field(mut self, path: impl Into<String>, metadata: FieldMetadata) -> Self {
        self.schema
            .fields
            .entry(path.into())
            .or_default()
            .metadata = metadata;
        self
    }

    /// Attaches a getter to a stored field, declaring it if needed.
    pub fn getter<F>(mut self, path: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.schema
            .fields
            .entry(path.into())
            .or_default()
            .getter = Some(Arc::new(getter));
        self
    }

    /// Declares a virtual field computed from the whole document.
    pub fn virtual_field<F>(mut self, path: impl Into<String>, metadata: FieldMetadata, compute: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.schema.virtuals.insert(
            path.into(),
            VirtualDef { metadata, compute: Arc::new(compute) },
        );
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_defaults_to_public() {
        let meta: FieldMetadata = serde_json::from_value(json!({})).unwrap();
        assert_eq!(meta, FieldMetadata::default());
        let meta: FieldMetadata = serde_json::from_value(json!({"writable": false})).unwrap();
        assert_eq!(meta, FieldMetadata::read_only());
    }

    #[test]
    fn from_metadata_json_keeps_order() {
        let schema = Schema::from_metadata_json(&json!({
            "name": {},
            "password": {"readable": false},
            "role": {"writable": false}
        }))
        .unwrap();
        let paths: Vec<&str> = schema.metadata().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["name", "password", "role"]);
        assert_eq!(schema.field("password").unwrap().metadata, FieldMetadata::hidden());
    }

    #[test]
    fn from_metadata_json_rejects_bad_input() {
        assert!(matches!(
            Schema::from_metadata_json(&json!([])),
            Err(SchemaError::NotAnObject)
        ));
        assert!(matches!(
            Schema::from_metadata_json(&json!({"a": {"readable": "no"}})),
            Err(SchemaError::InvalidField { path, .. }) if path == "a"
        ));
        assert!(matches!(
            Schema::from_metadata_json(&json!({"a..b": {}})),
            Err(SchemaError::InvalidPath { path, .. }) if path == "a..b"
        ));
    }

    #[test]
    fn virtuals_follow_fields_in_metadata() {
        let schema = Schema::builder()
            .virtual_field("fullName", FieldMetadata::default(), |_| json!("x"))
            .field("first", FieldMetadata::default())
            .build();
        let paths: Vec<&str> = schema.metadata().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["first", "fullName"]);
    }

    #[test]
    fn getter_declares_field() {
        let schema = Schema::builder()
            .getter("email", |v| json!(v.as_str().unwrap_or_default().to_lowercase()))
            .field("email", FieldMetadata::read_only())
            .build();
        let def = schema.field("email").unwrap();
        assert_eq!(def.metadata, FieldMetadata::read_only());
        let getter = def.getter.as_ref().unwrap();
        assert_eq!(getter(&json!("A@B.C")), json!("a@b.c"));
    }
}
