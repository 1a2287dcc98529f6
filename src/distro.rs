//! Target distribution/release resolution
//!
//! Configuration overrides always win; otherwise the host identity is read
//! from `/etc/os-release`. Failing to determine either value is fatal, since
//! the distribution pair names the default virtualenv and archive paths.

use std::fs;
use std::path::Path;

use crate::config::PackagerConfig;
use crate::error::{PackagerError, Result};

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Resolved target identity for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetParams {
    pub distribution: String,
    pub release: String,
}

/// Resolve the target distribution and release.
pub fn resolve(config: &PackagerConfig) -> Result<TargetParams> {
    resolve_with_os_release(config, Path::new(OS_RELEASE_PATH))
}

fn resolve_with_os_release(config: &PackagerConfig, os_release: &Path) -> Result<TargetParams> {
    if let (Some(distribution), Some(release)) = (&config.distribution, &config.release) {
        return Ok(TargetParams {
            distribution: distribution.clone(),
            release: release.clone(),
        });
    }

    let (detected_distro, detected_release) = detect(os_release)?;
    Ok(TargetParams {
        distribution: config.distribution.clone().unwrap_or(detected_distro),
        release: config.release.clone().unwrap_or(detected_release),
    })
}

/// Parse the host identity out of an os-release file.
///
/// `ID` names the distribution; the release is `VERSION_CODENAME` when
/// present (Debian family), `VERSION_ID` otherwise.
fn detect(os_release: &Path) -> Result<(String, String)> {
    let content = fs::read_to_string(os_release).map_err(|e| PackagerError::DistroResolveFailed {
        reason: format!("{}: {}", os_release.display(), e),
    })?;

    let mut id = None;
    let mut version_codename = None;
    let mut version_id = None;
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                "ID" => id = Some(value),
                "VERSION_CODENAME" => version_codename = Some(value),
                "VERSION_ID" => version_id = Some(value),
                _ => {}
            }
        }
    }

    let distribution = id.ok_or_else(|| PackagerError::DistroResolveFailed {
        reason: format!("no ID field in {}", os_release.display()),
    })?;
    let release =
        version_codename
            .or(version_id)
            .ok_or_else(|| PackagerError::DistroResolveFailed {
                reason: format!(
                    "no VERSION_CODENAME or VERSION_ID field in {}",
                    os_release.display()
                ),
            })?;

    Ok((distribution, release))
}
