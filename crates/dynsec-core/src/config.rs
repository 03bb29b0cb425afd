//! Runtime configuration for the dynsec relation store.
//!
//! Configuration is read from a TOML file:
//!
//! ```toml
//! [limits]
//! max_groups = 10000
//! max_roles = 10000
//! max_clients = 100000
//!
//! [load]
//! mode = "partial"
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is valid.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default capacity for groups.
pub const DEFAULT_MAX_GROUPS: usize = 10_000;
/// Default capacity for roles.
pub const DEFAULT_MAX_ROLES: usize = 10_000;
/// Default capacity for clients.
pub const DEFAULT_MAX_CLIENTS: usize = 100_000;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynsecConfig {
    /// Per-kind entity capacity.
    pub limits: Limits,
    /// Document load behaviour.
    pub load: LoadOptions,
}

/// Per-kind entity capacity.
///
/// Creating an entity beyond its limit fails with [`Error::OutOfMemory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of groups.
    pub max_groups: usize,
    /// Maximum number of roles.
    pub max_roles: usize,
    /// Maximum number of clients.
    pub max_clients: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_groups: DEFAULT_MAX_GROUPS,
            max_roles: DEFAULT_MAX_ROLES,
            max_clients: DEFAULT_MAX_CLIENTS,
        }
    }
}

impl Limits {
    /// Limits with no practical bound.
    pub fn unbounded() -> Self {
        Self {
            max_groups: usize::MAX,
            max_roles: usize::MAX,
            max_clients: usize::MAX,
        }
    }
}

/// How a multi-record document is applied to the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Records committed before a failing record stay in the store.
    #[default]
    Partial,
    /// The document is applied all-or-nothing.
    Atomic,
}

/// Options for document loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Partial or atomic application.
    pub mode: LoadMode,
}

impl LoadOptions {
    /// All-or-nothing loading.
    pub fn atomic() -> Self {
        Self {
            mode: LoadMode::Atomic,
        }
    }
}

impl DynsecConfig {
    /// Load configuration from `path`, or return defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("No configuration file given, using defaults");
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
