//! Ordered module installation
//!
//! The install pass is the heart of the packager. Order is a correctness
//! invariant: external dependencies land first, core modules before core
//! plugins, everything before the agent module, and core entries always in
//! their fixed reference order rather than the order configuration mappings
//! happen to iterate in. The pass records what it actually installed into a
//! [`FinalSet`]; install failures are never caught here.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::modules::{
    AGENT_MODULE_NAME, CORE_MODULES, CORE_PLUGINS, EXTERNAL_MODULES, MANDATORY_MODULES, ModuleSet,
    canonical_name,
};
use crate::progress::InstallProgress;
use crate::venv::Environment;

/// The authoritative record of what a run actually installed.
///
/// Names are appended in install order, each paired with an install call
/// that returned successfully. Read-only once the pass completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalSet {
    pub modules: Vec<String>,
    pub plugins: Vec<String>,
}

impl FinalSet {
    /// All recorded names, modules first, in install order.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.modules.iter().chain(self.plugins.iter())
    }
}

/// Performs the ordered install pass and builds the final set.
pub struct ModuleInstaller<'a, E: Environment> {
    modules: &'a ModuleSet,
    env: &'a E,
    requirements_file: Option<&'a Path>,
    progress: &'a InstallProgress,
    final_set: FinalSet,
}

impl<'a, E: Environment> ModuleInstaller<'a, E> {
    pub fn new(
        modules: &'a ModuleSet,
        env: &'a E,
        requirements_file: Option<&'a Path>,
        progress: &'a InstallProgress,
    ) -> Self {
        Self {
            modules,
            env,
            requirements_file,
            progress,
            final_set: FinalSet::default(),
        }
    }

    /// Run the full pass in mandated order and hand back the final set.
    pub fn run(mut self) -> Result<FinalSet> {
        info!("Installing external modules...");
        self.install_modules(EXTERNAL_MODULES.iter().copied())?;
        if let Some(requirements) = self.requirements_file {
            info!("Installing requirements file {}...", requirements.display());
            self.progress.update_module("requirements");
            self.env.install_requirements(requirements)?;
            self.progress.inc_module();
        }
        info!("Installing core modules...");
        self.install_core_modules()?;
        info!("Installing core plugins...");
        self.install_core_plugins()?;
        info!("Installing additional modules...");
        let additional = self.modules.additional_modules.clone();
        self.install_modules(additional.iter().map(String::as_str))?;
        info!("Installing additional plugins...");
        self.install_additional_plugins()?;
        self.install_agent()?;
        Ok(self.final_set)
    }

    /// Install a plain sequence of locators without recording them.
    fn install_modules<'m>(&mut self, modules: impl Iterator<Item = &'m str>) -> Result<()> {
        for module in modules {
            info!("Installing module {}", module);
            self.progress.update_module(module);
            self.env.install(module)?;
            self.progress.inc_module();
        }
        Ok(())
    }

    fn install_core_modules(&mut self) -> Result<()> {
        let core = &self.modules.core_modules;
        // Iterate the reference list so that dependencies install in order.
        for module in CORE_MODULES {
            let module_name = canonical_name(module);
            if let Some(locator) = core.get(*module) {
                info!("Installing module {} from {}.", module_name, locator);
                self.progress.update_module(&module_name);
                self.env.install(locator)?;
                self.progress.inc_module();
                self.final_set.modules.push(module_name);
            } else if MANDATORY_MODULES.contains(module) {
                info!(
                    "Module {} will be installed as a part of cloudify-agent (This is a mandatory module).",
                    module_name
                );
            } else {
                info!(
                    "Module {} will be installed as a part of cloudify-agent (if applicable).",
                    module_name
                );
            }
        }
        Ok(())
    }

    fn install_core_plugins(&mut self) -> Result<()> {
        let core = &self.modules.core_plugins;
        for plugin in CORE_PLUGINS {
            let plugin_name = canonical_name(plugin);
            match core.get(*plugin) {
                Some(spec) if spec.is_excluded() => {
                    info!(
                        "Module {} is excluded. it will not be a part of the agent.",
                        plugin_name
                    );
                }
                Some(spec) => {
                    if let Some(locator) = spec.locator() {
                        info!("Installing module {} from {}.", plugin_name, locator);
                        self.progress.update_module(&plugin_name);
                        self.env.install(locator)?;
                        self.progress.inc_module();
                        self.final_set.plugins.push(plugin_name);
                    }
                }
                None => {
                    info!(
                        "Module {} will be installed as a part of cloudify-agent (if applicable).",
                        plugin_name
                    );
                }
            }
        }
        Ok(())
    }

    fn install_additional_plugins(&mut self) -> Result<()> {
        let additional = self.modules.additional_plugins.clone();
        for (plugin, locator) in &additional {
            let plugin_name = canonical_name(plugin);
            info!("Installing module {} from {}.", plugin_name, locator);
            self.progress.update_module(&plugin_name);
            self.env.install(locator)?;
            self.progress.inc_module();
            self.final_set.plugins.push(plugin_name);
        }
        Ok(())
    }

    fn install_agent(&mut self) -> Result<()> {
        info!("Installing cloudify-agent module from {}", self.modules.agent);
        self.progress.update_module(AGENT_MODULE_NAME);
        self.env.install(&self.modules.agent)?;
        self.progress.inc_module();
        self.final_set.modules.push(AGENT_MODULE_NAME.to_string());
        Ok(())
    }
}

/// Total install calls a pass over `modules` will make; sizes the progress
/// display.
pub fn total_installs(modules: &ModuleSet, requirements_file: Option<&Path>) -> u64 {
    let core_modules = modules
        .core_modules
        .keys()
        .filter(|name| CORE_MODULES.contains(&name.as_str()))
        .count();
    let core_plugins = CORE_PLUGINS
        .iter()
        .filter(|name| {
            modules
                .core_plugins
                .get(**name)
                .is_some_and(|spec| !spec.is_excluded())
        })
        .count();
    (EXTERNAL_MODULES.len()
        + usize::from(requirements_file.is_some())
        + core_modules
        + core_plugins
        + modules.additional_modules.len()
        + modules.additional_plugins.len()
        + 1) as u64
}
