//! Canonical module-set model and configuration merging
//!
//! The module set is the single description of everything a run installs:
//! core modules and plugins keyed by their canonical reference names,
//! additional modules/plugins supplied freely by the operator, and the
//! agent module itself. The fixed reference lists below define the install
//! order; configuration mappings never do.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PackagerConfig;
use crate::error::{PackagerError, Result};

/// Fixed dependencies installed before anything else, never recorded.
pub const EXTERNAL_MODULES: &[&str] = &["celery==3.0.24"];

/// Core modules in their mandated install order.
pub const CORE_MODULES: &[&str] = &["cloudify_rest_client", "cloudify_plugins_common"];

/// Core plugins in their mandated install order.
pub const CORE_PLUGINS: &[&str] = &["cloudify_script_plugin", "cloudify_diamond_plugin"];

/// Core modules pulled in transitively by the agent module even when
/// not configured explicitly.
pub const MANDATORY_MODULES: &[&str] = &["cloudify_rest_client", "cloudify_plugins_common"];

/// Canonical name recorded for the agent module regardless of locator form.
pub const AGENT_MODULE_NAME: &str = "cloudify-agent";

/// Configuration value marking a core plugin as excluded.
pub const EXCLUDE_SENTINEL: &str = "exclude";

const AGENT_URL_TEMPLATE: &str = "https://github.com/nir0s/cloudify-agent/archive/{version}.tar.gz";

/// Agent module download URL for a plain version tag.
pub fn agent_url(version: &str) -> String {
    AGENT_URL_TEMPLATE.replace("{version}", version)
}

/// Canonical identifier form used for recording and presence checks.
///
/// Idempotent; a pure function of the module identifier.
pub fn canonical_name(module: &str) -> String {
    module.replace('_', "-")
}

/// A configured core plugin: either a source locator or an explicit exclusion.
///
/// The YAML form is a plain string; the literal `"exclude"` is the exclusion
/// marker, anything else is a locator (path, version spec, or URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSpec {
    Install(String),
    Exclude,
}

impl PluginSpec {
    /// The source locator, if this plugin is meant to be installed.
    pub fn locator(&self) -> Option<&str> {
        match self {
            PluginSpec::Install(locator) => Some(locator),
            PluginSpec::Exclude => None,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, PluginSpec::Exclude)
    }
}

impl Serialize for PluginSpec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            PluginSpec::Install(locator) => serializer.serialize_str(locator),
            PluginSpec::Exclude => serializer.serialize_str(EXCLUDE_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for PluginSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        if value == EXCLUDE_SENTINEL {
            Ok(PluginSpec::Exclude)
        } else {
            Ok(PluginSpec::Install(value))
        }
    }
}

/// The canonical, merged description of what a run must install.
///
/// Created once from the configuration and immutable afterwards. Keys in
/// `core_modules`/`core_plugins` outside the fixed reference lists are
/// accepted but never acted upon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleSet {
    pub core_modules: BTreeMap<String, String>,
    pub core_plugins: BTreeMap<String, PluginSpec>,
    pub additional_modules: Vec<String>,
    pub additional_plugins: BTreeMap<String, String>,
    pub agent: String,
}

/// Merge the built-in defaults with the user configuration.
///
/// Pure over its input: the only failure mode is a configuration that names
/// neither an agent module nor an agent version, which is unrecoverable.
pub fn merge(config: &PackagerConfig) -> Result<ModuleSet> {
    let mut modules = ModuleSet::default();

    // Empty locators behave like absent keys, matching loosely-typed configs
    // that set a key without a value.
    modules.core_modules.extend(
        config
            .core_modules
            .iter()
            .filter(|(_, locator)| !locator.is_empty())
            .map(|(name, locator)| (name.clone(), locator.clone())),
    );
    modules.core_plugins.extend(
        config
            .core_plugins
            .iter()
            .filter(|(_, spec)| spec.locator() != Some(""))
            .map(|(name, spec)| (name.clone(), spec.clone())),
    );

    for additional_module in &config.additional_modules {
        modules.additional_modules.push(additional_module.clone());
    }
    modules
        .additional_plugins
        .extend(config.additional_plugins.clone());

    modules.agent = if let Some(agent_module) = &config.cloudify_agent_module {
        agent_module.clone()
    } else if let Some(agent_version) = &config.cloudify_agent_version {
        agent_url(agent_version)
    } else {
        return Err(PackagerError::MissingAgentConfig);
    };

    Ok(modules)
}
