//! Create command implementation
//!
//! Thin wrapper around [`AgentPackager`]: resolves the config path, builds
//! the packager, and reports the outcome. The heavy lifting lives in
//! `packager.rs`.

use std::path::PathBuf;

use console::style;

use crate::cli::CreateArgs;
use crate::error::Result;
use crate::packager::{AgentPackager, CreateOptions, CreateOutcome, DEFAULT_CONFIG_FILE};

/// Run the create command
pub fn run(args: CreateArgs) -> Result<CreateOutcome> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let packager = AgentPackager::from_file(&config_path)?;
    let options = CreateOptions {
        force: args.force,
        dry_run: args.dry_run,
        no_validate: args.no_validate,
    };

    let outcome = packager.create(&options)?;
    if let CreateOutcome::Package(path) = &outcome {
        println!(
            "{} agent package created at {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
    }
    Ok(outcome)
}
