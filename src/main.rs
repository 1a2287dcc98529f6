//! agent-packager - Cloudify agent package creator
//!
//! A command line tool that provisions an isolated virtualenv, installs a
//! configured set of modules and plugins in dependency order, validates the
//! result, and archives it into a distributable tarball per target
//! distribution/release.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod archive;
mod cli;
mod commands;
mod config;
mod distro;
mod error;
mod includes;
mod installer;
mod modules;
mod packager;
mod progress;
mod validate;
mod venv;

use cli::{Cli, Commands};
use error::{DRYRUN_COMPLETE, Result};
use packager::CreateOutcome;

/// Configure logging once at process start.
///
/// Dry-run escalates to debug so the resolved module-set dump is visible.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Create(args) => {
            let outcome = commands::create::run(args)?;
            Ok(match outcome {
                CreateOutcome::Package(_) => 0,
                CreateOutcome::DryRun => DRYRUN_COMPLETE,
            })
        }
        Commands::Version => commands::version::run().map(|()| 0),
        Commands::Completions(args) => commands::completions::run(args).map(|()| 0),
    }
}

fn main() {
    let cli = Cli::parse();

    let escalate = matches!(&cli.command, Commands::Create(args) if args.dry_run);
    init_tracing(cli.verbose || escalate);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
