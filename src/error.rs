//! Error types and handling for the agent packager
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! Every variant maps to a distinct process exit code via [`PackagerError::exit_code`];
//! the mapping is consumed only at the `main` boundary.

use miette::Diagnostic;
use thiserror::Error;

/// Exit code signaled after a completed dry-run.
///
/// A notification, not an error: the run ended deliberately before any
/// install call, but scripts must be able to tell it apart from a full run.
pub const DRYRUN_COMPLETE: i32 = 2;

/// Main error type for packager operations
#[derive(Error, Diagnostic, Debug)]
pub enum PackagerError {
    // Configuration errors
    #[error("Cannot access config file: {path}")]
    #[diagnostic(
        code(packager::config::not_found),
        help("Check that the path exists and is readable, or pass -c/--config")
    )]
    ConfigNotFound { path: String, reason: String },

    #[error("Invalid yaml file: {path}")]
    #[diagnostic(code(packager::config::invalid_yaml))]
    ConfigParseFailed { path: String, reason: String },

    #[error(
        "Either `cloudify_agent_module` or `cloudify_agent_version` must be specified in the yaml configuration file"
    )]
    #[diagnostic(code(packager::config::missing_agent))]
    MissingAgentConfig,

    // Target resolution errors
    #[error(
        "Distribution not found in configuration and could not be retrieved automatically: {reason}"
    )]
    #[diagnostic(
        code(packager::distro::undetectable),
        help("Specify `distribution` and `release` in the yaml configuration file")
    )]
    DistroResolveFailed { reason: String },

    // Environment conflicts
    #[error("Virtualenv already exists at {path}")]
    #[diagnostic(
        code(packager::venv::already_exists),
        help("Use the -f flag or delete the previous environment")
    )]
    VenvAlreadyExists { path: String },

    #[error("Destination tar already exists: {path}")]
    #[diagnostic(
        code(packager::archive::already_exists),
        help("Use the -f flag or delete the previous archive")
    )]
    ArchiveAlreadyExists { path: String },

    #[error("Could not create virtualenv: {path}")]
    #[diagnostic(code(packager::venv::create_failed))]
    VenvCreateFailed { path: String, reason: String },

    // Install/uninstall errors
    #[error("Could not install module: {locator}")]
    #[diagnostic(code(packager::install::failed))]
    InstallFailed { locator: String, reason: String },

    #[error("Could not uninstall module: {name}")]
    #[diagnostic(code(packager::uninstall::failed))]
    UninstallFailed { name: String, reason: String },

    // Post-install validation
    #[error("Validation failed. Some of the requested modules were not installed: {missing}")]
    #[diagnostic(
        code(packager::validate::failed),
        help("Check the per-module log lines above for the full breakdown")
    )]
    ValidationFailed { missing: String },

    // Metadata rendering
    #[error("Could not generate the included plugins file: {reason}")]
    #[diagnostic(code(packager::includes::render_failed))]
    IncludesRenderFailed { reason: String },

    // Archive creation
    #[error("Failed to create tar file: {path}")]
    #[diagnostic(code(packager::archive::create_failed))]
    ArchiveCreateFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(packager::fs::io_error))]
    IoError { message: String },
}

impl PackagerError {
    /// Distinct process exit code for this error.
    ///
    /// The table mirrors the original errors/notifications split: fatal
    /// conditions get their own integer so operators can branch on them.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackagerError::ConfigNotFound { .. } => 100,
            PackagerError::ConfigParseFailed { .. } => 101,
            PackagerError::MissingAgentConfig => 110,
            PackagerError::DistroResolveFailed { .. } => 111,
            PackagerError::VenvAlreadyExists { .. } => 120,
            PackagerError::ArchiveAlreadyExists { .. } => 121,
            PackagerError::VenvCreateFailed { .. } => 122,
            PackagerError::InstallFailed { .. } => 130,
            PackagerError::UninstallFailed { .. } => 131,
            PackagerError::ValidationFailed { .. } => 140,
            PackagerError::IncludesRenderFailed { .. } => 150,
            PackagerError::ArchiveCreateFailed { .. } => 151,
            PackagerError::IoError { .. } => 1,
        }
    }
}

impl From<std::io::Error> for PackagerError {
    fn from(err: std::io::Error) -> Self {
        PackagerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PackagerError>;
