//! Field-level access metadata and the blacklists derived from it.

pub mod blacklist;
pub mod config;
pub mod schema;

pub use blacklist::{AccessPolicy, Blacklist};
pub use config::{AccessConfig, AccessConfigError, ID_FIELD, VERSION_FIELD};
pub use schema::{FieldDef, FieldMetadata, Schema, SchemaBuilder, SchemaError, VirtualDef};
