//! Core logic of the `json-guard` binary.
//!
//! - `json-guard patch <schema.json> '<patch>'`: patch the document read from
//!   stdin and print it
//! - `json-guard filter <schema.json> [extra...]`: print the filtered
//!   projection of the document (or array of documents) read from stdin
//!
//! The schema file is a metadata map such as
//! `{"password": {"readable": false}, "role": {"writable": false}}`.

use serde_json::Value;

use crate::access::{AccessConfig, AccessConfigError, Schema, SchemaError};
use crate::document::{Document, PersistenceError};
use crate::guard::GuardError;
use crate::model::Model;

/// Environment variable naming an optional TOML access config.
pub const CONFIG_ENV: &str = "JSON_GUARD_CONFIG";

const MODEL_NAME: &str = "cli";

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Usage(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Schema(SchemaError),
    Config(AccessConfigError),
    Guard(GuardError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(e)  => write!(f, "{e}"),
            CliError::Io(e)     => write!(f, "{e}"),
            CliError::Json(e)   => write!(f, "{e}"),
            CliError::Schema(e) => write!(f, "{e}"),
            CliError::Config(e) => write!(f, "{e}"),
            CliError::Guard(e)  => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self { CliError::Io(e) }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { CliError::Json(e) }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self { CliError::Schema(e) }
}

impl From<AccessConfigError> for CliError {
    fn from(e: AccessConfigError) -> Self { CliError::Config(e) }
}

impl From<GuardError> for CliError {
    fn from(e: GuardError) -> Self { CliError::Guard(e) }
}

// ── Arguments ─────────────────────────────────────────────────────────────

pub const USAGE: &str =
    "Usage: json-guard patch <schema.json> '<patch>' | json-guard filter <schema.json> [extra...]";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Patch { schema_path: String, patch: String },
    Filter { schema_path: String, extra: Vec<String> },
}

impl Command {
    /// Parses `args` as produced by `std::env::args()`, program name first.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let usage = || CliError::Usage(USAGE.to_string());
        let (Some(command), Some(schema_path)) = (args.get(1), args.get(2)) else {
            return Err(usage());
        };
        let schema_path = schema_path.clone();
        match command.as_str() {
            "patch" => {
                let patch = args.get(3).cloned().ok_or_else(|| {
                    CliError::Usage("Third argument must be a JSON patch array.".to_string())
                })?;
                Ok(Command::Patch { schema_path, patch })
            }
            "filter" => Ok(Command::Filter { schema_path, extra: args[3..].to_vec() }),
            _ => Err(usage()),
        }
    }

    /// Runs the command against `input`, the document text read from stdin.
    pub fn run(&self, input: &str, config: &AccessConfig) -> Result<String, CliError> {
        match self {
            Command::Patch { schema_path, patch } => {
                let schema = std::fs::read_to_string(schema_path)?;
                patch_document(&schema, input, patch, config)
            }
            Command::Filter { schema_path, extra } => {
                let schema = std::fs::read_to_string(schema_path)?;
                let extra: Vec<&str> = extra.iter().map(String::as_str).collect();
                filter_documents(&schema, input, &extra, config)
            }
        }
    }
}

// ── Config ────────────────────────────────────────────────────────────────

/// Loads the config at `path`, or the defaults when there is none.
pub fn load_config(path: Option<&str>) -> Result<AccessConfig, CliError> {
    match path {
        Some(path) => Ok(AccessConfig::from_toml_file(path)?),
        None => Ok(AccessConfig::default()),
    }
}

fn model(schema_json: &str, config: &AccessConfig) -> Result<Model, CliError> {
    let metadata: Value = serde_json::from_str(schema_json)?;
    let schema = Schema::from_metadata_json(&metadata)?;
    Ok(Model::register(MODEL_NAME, schema, config))
}

// ── patch ─────────────────────────────────────────────────────────────────

/// Applies `patch_json` to `doc_json` under the access rules of
/// `schema_json`. Returns the patched document, pretty-printed.
///
/// Nothing is persisted; the patched document is echoed back.
pub fn patch_document(
    schema_json: &str,
    doc_json: &str,
    patch_json: &str,
    config: &AccessConfig,
) -> Result<String, CliError> {
    let model = model(schema_json, config)?;
    let mut doc = Document::new(serde_json::from_str(doc_json)?);
    let patch: Value = serde_json::from_str(patch_json)?;
    let mut echo = |doc: &Document| -> Result<Value, PersistenceError> { Ok(doc.value().clone()) };
    let out = model.patch_json(&mut doc, &patch, &mut echo)?;
    Ok(serde_json::to_string_pretty(&out)?)
}

// ── filter ────────────────────────────────────────────────────────────────

/// Filters a document, or each document of an array, under the access rules
/// of `schema_json`. Returns the result pretty-printed.
pub fn filter_documents(
    schema_json: &str,
    input_json: &str,
    extra: &[&str],
    config: &AccessConfig,
) -> Result<String, CliError> {
    let model = model(schema_json, config)?;
    let out = match serde_json::from_str(input_json)? {
        Value::Array(items) => {
            let docs: Vec<Document> = items.into_iter().map(Document::new).collect();
            Value::Array(model.filter_protected_all(&docs, extra))
        }
        single => model.filter_protected(&Document::new(single), extra),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────
