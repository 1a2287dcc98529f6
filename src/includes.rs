//! Included-plugins metadata file
//!
//! After installation the agent package carries a generated
//! `included_plugins.py` inside the `cloudify_agent` package namespace,
//! listing every plugin bundled into the environment. The agent module may
//! ship one of its own; its entries are preserved across regeneration.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PackagerError, Result};
use crate::installer::FinalSet;

const INCLUDES_TEMPLATE: &str = include_str!("../resources/included_plugins.py.in");
const INCLUDES_FILE: &str = "included_plugins.py";
const AGENT_PACKAGE_DIR: &str = "cloudify_agent";

/// Render the includes file into the environment's agent package namespace.
///
/// Returns the path of the generated file.
pub fn render(final_set: &FinalSet, venv: &Path) -> Result<PathBuf> {
    debug!("generating includes file");

    let site_packages = find_site_packages(venv)?;
    let target_dir = site_packages.join(AGENT_PACKAGE_DIR);
    let output_file = target_dir.join(INCLUDES_FILE);
    debug!("includes file path: {}", output_file.display());

    let mut plugins = final_set.plugins.clone();
    if output_file.is_file() {
        let existing = fs::read_to_string(&output_file)
            .map_err(|e| PackagerError::IncludesRenderFailed { reason: e.to_string() })?;
        for name in quoted_names(&existing) {
            if !plugins.contains(&name) {
                plugins.push(name);
            }
        }
    }

    let entries: Vec<String> = plugins
        .iter()
        .map(|plugin| format!("    '{plugin}',"))
        .collect();
    let rendered = INCLUDES_TEMPLATE.replace("{plugins}", &entries.join("\n"));

    fs::create_dir_all(&target_dir)
        .map_err(|e| PackagerError::IncludesRenderFailed { reason: e.to_string() })?;
    fs::write(&output_file, rendered)
        .map_err(|e| PackagerError::IncludesRenderFailed { reason: e.to_string() })?;
    Ok(output_file)
}

/// Locate the environment's site-packages directory.
fn find_site_packages(venv: &Path) -> Result<PathBuf> {
    let lib_dir = venv.join("lib");
    WalkDir::new(&lib_dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|entry| entry.file_type().is_dir() && entry.file_name() == "site-packages")
        .map(|entry| entry.path().to_path_buf())
        .ok_or_else(|| PackagerError::IncludesRenderFailed {
            reason: format!("no site-packages directory under {}", lib_dir.display()),
        })
}

/// Extract single-quoted names from a previously generated includes file.
fn quoted_names(content: &str) -> Vec<String> {
    content
        .split('\'')
        .skip(1)
        .step_by(2)
        .map(ToString::to_string)
        .collect()
}
