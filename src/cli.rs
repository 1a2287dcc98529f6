//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agent-packager - Cloudify agent package creator
///
/// Builds distributable agent packages for a target distribution/release.
#[derive(Parser, Debug)]
#[command(
    name = "agent-packager",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Creates Cloudify agent packages",
    long_about = "agent-packager provisions an isolated virtualenv, installs a configured set of \
                  modules and plugins into it in dependency order, validates the result, and \
                  archives it into a distributable tarball per target distribution/release.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  agent-packager create\n    \
                  agent-packager create -c my-config.yaml -f\n    \
                  agent-packager create --dry-run -v\n    \
                  agent-packager create --no-validate\n\n\
                  \x1b[1m\x1b[32mDocumentation:\x1b[0m\n    \
                  https://github.com/cloudify-cosmo/agent-packager"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an agent package
    Create(CreateArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the create command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Create from the default config.yaml:\n    agent-packager create\n\n\
                  Create from a specific config file:\n    agent-packager create -c centos-config.yaml\n\n\
                  Recreate over a previous run:\n    agent-packager create -f\n\n\
                  Inspect the resolved module set without installing:\n    agent-packager create --dry-run -v\n\n\
                  Skip post-install validation:\n    agent-packager create --no-validate")]
pub struct CreateArgs {
    /// Path to the yaml configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remove a pre-existing virtualenv or output archive before running
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Resolve and log the module set without installing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip post-install validation
    #[arg(long)]
    pub no_validate: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    agent-packager completions --shell bash\n\n\
                  Generate zsh completions:\n    agent-packager completions --shell zsh")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
