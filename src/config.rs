//! Engine options loaded from TOML.
//!
//! ```toml
//! [validation]
//! reject_unqueryable = false
//!
//! [aggregation]
//! aggregate_non_numeric_fields = true
//! preferred = "avg"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::ast::AggregateFunction;

/// Options controlling schema validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Report references to properties whose queryable state is `Error`.
    pub reject_unqueryable: bool,
    /// Check operand types of comparisons, In, and text predicates.
    pub check_value_types: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_unqueryable: true,
            check_value_types: true,
        }
    }
}

/// Options for wrapping fields in aggregates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AggregationOptions {
    /// Fall back to `CountNonNull` for fields without a default aggregate.
    pub aggregate_non_numeric_fields: bool,
    /// Aggregate tried first when the field supports it.
    pub preferred: Option<AggregateFunction>,
}

/// Top-level engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation switches.
    pub validation: ValidationOptions,
    /// Aggregate selection.
    pub aggregation: AggregationOptions,
}

impl Config {
    /// Parses a configuration document; omitted keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Reads the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), ?config, "loaded sqexpr config");
        Ok(config)
    }

    /// Like [`Config::load`], but a missing or unspecified file yields the defaults.
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
