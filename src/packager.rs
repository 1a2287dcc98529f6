//! End-to-end package creation
//!
//! `AgentPackager` drives the linear pipeline: load config, resolve the
//! target identity, provision the virtualenv, merge the module set, install,
//! uninstall excluded plugins, validate, render the includes file, archive,
//! and clean up. Every step either succeeds or aborts the run with a typed
//! error; there are no retries and no partial recovery. A failed run leaves
//! the environment in whatever state the last successful step produced.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive;
use crate::config::PackagerConfig;
use crate::distro::{self, TargetParams};
use crate::error::{PackagerError, Result};
use crate::includes;
use crate::installer::{self, ModuleInstaller};
use crate::modules::{self, CORE_PLUGINS, canonical_name};
use crate::progress::InstallProgress;
use crate::validate;
use crate::venv::{Environment, Virtualenv};

/// Config file read when -c/--config is not given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Options controlling a single create run.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Remove a pre-existing virtualenv or archive instead of failing
    pub force: bool,
    /// Resolve and log the module set, then stop before installing
    pub dry_run: bool,
    /// Skip post-install validation
    pub no_validate: bool,
}

/// How a create run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The package was created at the given path
    Package(PathBuf),
    /// Dry-run requested; nothing was installed
    DryRun,
}

/// Creates an agent package (tar.gz) from a packager configuration.
pub struct AgentPackager {
    config: PackagerConfig,
}

impl AgentPackager {
    pub fn new(config: PackagerConfig) -> Self {
        Self { config }
    }

    pub fn from_file(config_file: &Path) -> Result<Self> {
        Ok(Self::new(PackagerConfig::load(config_file)?))
    }

    /// Run the full pipeline.
    pub fn create(&self, options: &CreateOptions) -> Result<CreateOutcome> {
        let target = distro::resolve(&self.config)?;
        let python = self.config.python_path();
        let venv_path = self
            .config
            .venv
            .clone()
            .unwrap_or_else(|| default_venv_path(&target));
        let destination_tar = self
            .config
            .output_tar
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_archive_name(&target)));

        debug!("Distribution is: {}", target.distribution);
        debug!("Distribution release is: {}", target.release);
        debug!("Python path is: {}", python);
        debug!("venv is: {}", venv_path.display());
        debug!("Destination tarfile is: {}", destination_tar.display());

        prepare_environment_dir(&venv_path, options)?;
        info!("Creating virtualenv: {}", venv_path.display());
        let venv = Virtualenv::new(&venv_path);
        venv.create(python)?;

        prepare_output_path(&destination_tar, options)?;

        debug!("Retrieving modules to install...");
        let module_set = modules::merge(&self.config)?;
        let dump = serde_json::to_string_pretty(&module_set)
            .unwrap_or_else(|_| format!("{module_set:#?}"));
        debug!("Modules to install: {}", dump);

        if options.dry_run {
            info!("Dryrun complete!");
            return Ok(CreateOutcome::DryRun);
        }

        let requirements = self.config.requirements_file.as_deref();
        let progress = InstallProgress::new(installer::total_installs(&module_set, requirements));
        let final_set =
            match ModuleInstaller::new(&module_set, &venv, requirements, &progress).run() {
                Ok(final_set) => {
                    progress.finish();
                    final_set
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            };

        // The agent module may have pulled in a plugin the operator excluded.
        info!("Uninstalling excluded plugins (if any)...");
        for plugin in CORE_PLUGINS {
            let plugin_name = canonical_name(plugin);
            let excluded = module_set
                .core_plugins
                .get(*plugin)
                .is_some_and(|spec| spec.is_excluded());
            if excluded && venv.is_installed(&plugin_name)? {
                info!("Uninstalling {}", plugin_name);
                venv.uninstall(&plugin_name)?;
            }
        }

        if options.no_validate {
            info!("Skipping installation validation.");
        } else {
            validate::validate(&final_set, &venv)?;
        }

        includes::render(&final_set, venv.root())?;

        archive::create_tarball(venv.root(), &destination_tar)?;

        info!(
            "The following modules were installed in the agent:\n{}",
            venv.freeze()?
        );

        if self.config.keep_venv {
            info!("Keeping origin virtualenv at {}", venv_path.display());
        } else {
            info!("Removing origin virtualenv");
            fs::remove_dir_all(&venv_path)?;
        }

        info!("Process complete!");
        Ok(CreateOutcome::Package(destination_tar))
    }
}

fn prepare_environment_dir(venv_path: &Path, options: &CreateOptions) -> Result<()> {
    if venv_path.is_dir() {
        if options.force {
            info!("Removing previous virtualenv...");
            fs::remove_dir_all(venv_path)?;
        } else {
            return Err(PackagerError::VenvAlreadyExists {
                path: venv_path.display().to_string(),
            });
        }
    }
    Ok(())
}

fn prepare_output_path(destination_tar: &Path, options: &CreateOptions) -> Result<()> {
    if destination_tar.exists() {
        if options.force {
            info!("Removing previous agent package...");
            fs::remove_file(destination_tar)?;
        } else {
            return Err(PackagerError::ArchiveAlreadyExists {
                path: destination_tar.display().to_string(),
            });
        }
    }
    Ok(())
}

fn default_venv_path(target: &TargetParams) -> PathBuf {
    PathBuf::from(format!(
        "cloudify/{}-{}-agent/env",
        target.distribution, target.release
    ))
}

fn default_archive_name(target: &TargetParams) -> String {
    archive_name(
        target,
        std::env::var("VERSION").ok().as_deref(),
        std::env::var("PRERELEASE").ok().as_deref(),
        std::env::var("BUILD").ok().as_deref(),
    )
}

/// Archive name for a target, optionally stamped with build version info.
fn archive_name(
    target: &TargetParams,
    version: Option<&str>,
    prerelease: Option<&str>,
    build: Option<&str>,
) -> String {
    let base = format!("{}-{}-agent", target.distribution, target.release);
    let Some(version) = version else {
        return format!("{base}.tar.gz");
    };
    let mut name = format!("{base}_{version}");
    if let Some(prerelease) = prerelease {
        name.push_str(&format!("-{prerelease}"));
    }
    if let Some(build) = build {
        name.push_str(&format!("-b{build}"));
    }
    format!("{name}.tar.gz")
}
