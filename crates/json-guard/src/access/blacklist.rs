//! Read and write blacklists of a document type.

use indexmap::IndexSet;
use json_guard_pointer::{format_json_pointer, parse_dot_path, Path};

use super::config::AccessConfig;
use super::schema::Schema;

/// An ordered, deduplicated set of dot paths.
///
/// Order is insertion order so diagnostics are stable: global exclusions
/// come first, then schema fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    paths: IndexSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, dot_path: &str) -> bool {
        self.paths.contains(dot_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// The blacklisted paths split into field names.
    pub fn paths(&self) -> impl Iterator<Item = Path> + '_ {
        self.paths.iter().map(|p| parse_dot_path(p))
    }

    /// The blacklisted paths in JSON Pointer form, components escaped.
    pub fn pointers(&self) -> impl Iterator<Item = String> + '_ {
        self.paths().map(|p| format_json_pointer(&p))
    }

    /// Returns a new blacklist with `extra` appended.
    pub fn union<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = self.clone();
        out.extend(extra);
        out
    }
}

impl<S: Into<String>> Extend<S> for Blacklist {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.paths.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut out = Blacklist::new();
        out.extend(iter);
        out
    }
}

/// The effective blacklists of one document type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub read: Blacklist,
    pub write: Blacklist,
}

impl AccessPolicy {
    /// `read  = global read  ∪ { p : !readable }`
    /// `write = global write ∪ { p : !writable }`
    pub fn resolve(schema: &Schema, config: &AccessConfig) -> Self {
        let mut read: Blacklist = config.global_read_blacklist.iter().cloned().collect();
        let mut write: Blacklist = config.global_write_blacklist.iter().cloned().collect();
        for (path, meta) in schema.metadata() {
            if !meta.readable {
                read.extend([path]);
            }
            if !meta.writable {
                write.extend([path]);
            }
        }
        tracing::debug!(
            read = read.len(),
            write = write.len(),
            "resolved field blacklists"
        );
        Self { read, write }
    }
}
