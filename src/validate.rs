//! Post-install validation
//!
//! Cross-checks the recorded final set against the live environment. The
//! scan never stops at the first miss: every absent name is collected so a
//! single failing run yields the complete diagnostic.

use tracing::{error, info};

use crate::error::{PackagerError, Result};
use crate::installer::FinalSet;
use crate::venv::Environment;

/// Verify that every recorded module and plugin is present in the environment.
pub fn validate<E: Environment>(final_set: &FinalSet, env: &E) -> Result<()> {
    info!("Validating installation...");
    let mut failed: Vec<String> = Vec::new();

    for module_name in final_set.all() {
        info!("Validating that {} is installed.", module_name);
        if !env.is_installed(module_name)? {
            error!(
                "It appears that {} does not exist in {}",
                module_name,
                env.root().display()
            );
            failed.push(module_name.clone());
        }
    }

    if !failed.is_empty() {
        return Err(PackagerError::ValidationFailed {
            missing: failed.join(", "),
        });
    }
    Ok(())
}
