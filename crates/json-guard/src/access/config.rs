//! Process-wide access configuration.
//!
//! ```toml
//! global_read_blacklist = ["internal.notes"]
//! global_write_blacklist = ["_id", "__v", "createdAt"]
//!
//! [apply]
//! rollback_on_failure = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use json_guard_pointer::{validate_dot_path, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guard::ApplyOptions;

/// Identity field of a stored document.
pub const ID_FIELD: &str = "_id";

/// Internal version field of a stored document.
pub const VERSION_FIELD: &str = "__v";

#[derive(Debug, Error)]
pub enum AccessConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid access config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid blacklist path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: ValidationError,
    },
}

/// Global exclusions applied to every registered document type, plus the
/// apply behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub global_read_blacklist: Vec<String>,
    pub global_write_blacklist: Vec<String>,
    pub apply: ApplyOptions,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            global_read_blacklist: Vec::new(),
            global_write_blacklist: vec![ID_FIELD.to_string(), VERSION_FIELD.to_string()],
            apply: ApplyOptions::default(),
        }
    }
}

impl AccessConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, AccessConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every global blacklist entry is a well-formed dot path.
    pub fn validate(&self) -> Result<(), AccessConfigError> {
        for path in self.global_read_blacklist.iter().chain(&self.global_write_blacklist) {
            validate_dot_path(path).map_err(|source| AccessConfigError::InvalidPath {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, AccessConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AccessConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
