//! Virtualenv collaborator
//!
//! The [`Environment`] trait is the seam between the orchestration logic and
//! the tools that actually create environments and install packages. The
//! production implementation shells out to `virtualenv` and the environment's
//! own `pip`; unit tests substitute an in-memory mock.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{PackagerError, Result};

/// An isolated install target for the module set.
pub trait Environment {
    /// Root directory of the environment.
    fn root(&self) -> &Path;

    /// Create the environment with the given interpreter.
    fn create(&self, python: &str) -> Result<()>;

    /// Install a package given any pip-understood locator.
    fn install(&self, locator: &str) -> Result<()>;

    /// Install every requirement listed in a requirements file.
    fn install_requirements(&self, path: &Path) -> Result<()>;

    /// Uninstall a package by name.
    fn uninstall(&self, name: &str) -> Result<()>;

    /// The environment's installed-package listing (`pip freeze` form).
    fn freeze(&self) -> Result<String>;

    /// Whether a package is present, by case-insensitive name search over
    /// the installed-package listing.
    fn is_installed(&self, name: &str) -> Result<bool> {
        let installed = self.freeze()?.to_lowercase();
        let present = installed.contains(&name.to_lowercase());
        if present {
            debug!("Package {} is installed in {}", name, self.root().display());
        } else {
            debug!("Package {} is not installed in {}", name, self.root().display());
        }
        Ok(present)
    }
}

/// A python virtualenv on disk.
pub struct Virtualenv {
    root: PathBuf,
}

impl Virtualenv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The environment's executable directory.
    fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    fn pip(&self) -> PathBuf {
        self.bin_dir().join("pip")
    }

    fn run(cmd: &mut Command) -> std::io::Result<Output> {
        debug!("Executing: {:?}", cmd);
        cmd.output()
    }

    fn stderr_of(output: &Output) -> String {
        String::from_utf8_lossy(&output.stderr).trim().to_string()
    }
}

impl Environment for Virtualenv {
    fn root(&self) -> &Path {
        &self.root
    }

    fn create(&self, python: &str) -> Result<()> {
        let output = Self::run(Command::new("virtualenv").arg("-p").arg(python).arg(&self.root))
            .map_err(|e| PackagerError::VenvCreateFailed {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(PackagerError::VenvCreateFailed {
                path: self.root.display().to_string(),
                reason: Self::stderr_of(&output),
            });
        }
        Ok(())
    }

    fn install(&self, locator: &str) -> Result<()> {
        debug!("Installing {} in venv {}", locator, self.root.display());
        let output = Self::run(Command::new(self.pip()).arg("install").arg(locator)).map_err(
            |e| PackagerError::InstallFailed {
                locator: locator.to_string(),
                reason: e.to_string(),
            },
        )?;
        if !output.status.success() {
            return Err(PackagerError::InstallFailed {
                locator: locator.to_string(),
                reason: Self::stderr_of(&output),
            });
        }
        Ok(())
    }

    fn install_requirements(&self, path: &Path) -> Result<()> {
        debug!("Installing {} in venv {}", path.display(), self.root.display());
        let output = Self::run(Command::new(self.pip()).arg("install").arg("-r").arg(path))
            .map_err(|e| PackagerError::InstallFailed {
                locator: path.display().to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(PackagerError::InstallFailed {
                locator: path.display().to_string(),
                reason: Self::stderr_of(&output),
            });
        }
        Ok(())
    }

    fn uninstall(&self, name: &str) -> Result<()> {
        debug!("Uninstalling {} in venv {}", name, self.root.display());
        let output = Self::run(Command::new(self.pip()).arg("uninstall").arg("-y").arg(name))
            .map_err(|e| PackagerError::UninstallFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(PackagerError::UninstallFailed {
                name: name.to_string(),
                reason: Self::stderr_of(&output),
            });
        }
        Ok(())
    }

    fn freeze(&self) -> Result<String> {
        let output = Self::run(Command::new(self.pip()).arg("freeze")).map_err(|e| {
            PackagerError::IoError {
                message: format!("pip freeze failed in {}: {}", self.root.display(), e),
            }
        })?;
        if !output.status.success() {
            return Err(PackagerError::IoError {
                message: format!(
                    "pip freeze failed in {}: {}",
                    self.root.display(),
                    Self::stderr_of(&output)
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
