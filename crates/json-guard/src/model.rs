//! A registered document type: its schema, blacklists and apply options.

use serde_json::Value;

use crate::access::{AccessConfig, AccessPolicy, Blacklist, Schema};
use crate::document::{Document, DocumentStore, Patchable, ToObjectOptions};
use crate::filter;
use crate::guard::{apply_guarded, check_write_access, ApplyOptions, GuardError, InvalidPatch};
use crate::json_patch::{from_json_patch, validate_operations, Op};

/// Immutable after [`Model::register`]; share it behind an `Arc` if needed.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    schema: Schema,
    policy: AccessPolicy,
    options: ApplyOptions,
}

impl Model {
    /// Resolves the read and write blacklists of `schema` once.
    pub fn register(name: impl Into<String>, schema: Schema, config: &AccessConfig) -> Self {
        let name = name.into();
        let policy = AccessPolicy::resolve(&schema, config);
        tracing::debug!(
            model = %name,
            read = policy.read.len(),
            write = policy.write.len(),
            "registered document type"
        );
        Self { name, schema, policy, options: config.apply }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn read_blacklist(&self) -> &Blacklist {
        &self.policy.read
    }

    pub fn write_blacklist(&self) -> &Blacklist {
        &self.policy.write
    }

    pub fn apply_options(&self) -> ApplyOptions {
        self.options
    }

    /// Checks, applies and persists `ops`, returning the patched value of
    /// `target`.
    ///
    /// Operation paths are relative to `target`; a nested target is checked
    /// against the blacklist at its location in the owner, and saved through
    /// the owner.
    pub fn patch<T>(
        &self,
        target: &mut T,
        ops: Vec<Op>,
        store: &mut dyn DocumentStore,
    ) -> Result<Value, GuardError>
    where
        T: Patchable + ?Sized,
    {
        tracing::debug!(model = %self.name, ops = ops.len(), "patching document");
        check_write_access(&self.policy.write, target.base_path(), &ops)?;
        apply_guarded(target, ops, self.options)?;
        target.persist(store).map_err(|err| {
            tracing::warn!(model = %self.name, error = %err, "failed to persist patched document");
            GuardError::Persistence(err)
        })?;
        Ok(target.state().value.clone())
    }

    /// Like [`Model::patch`], starting from a raw RFC 6902 document.
    pub fn patch_json<T>(
        &self,
        target: &mut T,
        patch: &Value,
        store: &mut dyn DocumentStore,
    ) -> Result<Value, GuardError>
    where
        T: Patchable + ?Sized,
    {
        validate_operations(patch).map_err(|err| {
            tracing::warn!(model = %self.name, error = %err, "rejected malformed patch");
            GuardError::from(err)
        })?;
        let ops = from_json_patch(patch).map_err(InvalidPatch::from)?;
        self.patch(target, ops, store)
    }

    /// The computed projection of `doc` with every read-blacklisted path and
    /// every path in `extra` removed.
    pub fn filter_protected(&self, doc: &Document, extra: &[&str]) -> Value {
        let projection = doc.to_plain_object(&self.schema, ToObjectOptions::computed());
        filter::filter_protected(projection, &self.policy.read, extra)
    }

    /// [`Model::filter_protected`] for each document, in order.
    pub fn filter_protected_all(&self, docs: &[Document], extra: &[&str]) -> Vec<Value> {
        filter::filter_protected_all(
            docs.iter()
                .map(|doc| doc.to_plain_object(&self.schema, ToObjectOptions::computed())),
            &self.policy.read,
            extra,
        )
    }
}
