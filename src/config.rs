//! Packager configuration (config.yaml)
//!
//! The configuration file describes the target distribution, the environment
//! paths, and the module set to bundle. Unknown top-level keys are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackagerError, Result};
use crate::modules::PluginSpec;

/// Interpreter used when `python_path` is not configured.
pub const DEFAULT_PYTHON: &str = "/usr/bin/python";

/// Packager configuration from config.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    /// Target distribution identity (host-detected when absent)
    pub distribution: Option<String>,

    /// Target distribution release (host-detected when absent)
    pub release: Option<String>,

    /// Interpreter the virtualenv is created with
    pub python_path: Option<String>,

    /// Virtualenv directory to create and install into
    pub venv: Option<PathBuf>,

    /// Keep the virtualenv directory after archiving
    pub keep_venv: bool,

    /// Destination archive path
    pub output_tar: Option<PathBuf>,

    /// Core module name -> source locator
    pub core_modules: BTreeMap<String, String>,

    /// Core plugin name -> source locator or the `exclude` marker
    pub core_plugins: BTreeMap<String, PluginSpec>,

    /// Locators installed verbatim, in listed order
    pub additional_modules: Vec<String>,

    /// Additional plugin name -> source locator
    pub additional_plugins: BTreeMap<String, String>,

    /// Explicit agent module locator (preferred over the version tag)
    pub cloudify_agent_module: Option<String>,

    /// Agent version tag, resolved against the fixed download URL template
    pub cloudify_agent_version: Option<String>,

    /// Optional requirements file installed before the module set
    pub requirements_file: Option<PathBuf>,
}

impl PackagerConfig {
    /// Load and parse a configuration file.
    ///
    /// An unreadable path and malformed yaml are distinct failures; operators
    /// branch on their exit codes.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Config file is: {}", path.display());
        let raw = fs::read_to_string(path).map_err(|e| PackagerError::ConfigNotFound {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&raw, path)
    }

    /// Parse configuration from a yaml string.
    ///
    /// An empty document is a valid, empty configuration.
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| PackagerError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Interpreter path for virtualenv creation.
    pub fn python_path(&self) -> &str {
        self.python_path.as_deref().unwrap_or(DEFAULT_PYTHON)
    }
}
