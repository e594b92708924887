//! Command-line arguments.
use clap::Parser;
use std::path::PathBuf;

use crate::context::Options;

/// Version string baked in by the build script, falling back to the crate
/// version.
pub const VERSION: &str = match option_env!("DOTFILES_DEPLOY_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Link dotfiles into home and deploy auxiliary configuration repositories.
#[derive(Parser, Debug, Clone)]
#[command(name = "dotfiles-deploy", version = VERSION)]
pub struct Cli {
    /// Suppress progress messages and never prompt
    #[arg(short, long)]
    pub quiet: bool,

    /// Replace conflicting files and links
    #[arg(long)]
    pub overwrite: bool,

    /// Remove links and checkouts instead of installing them
    #[arg(long)]
    pub uninstall: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Override dotfiles root directory (default: $DOTFILES_ROOT, else the
    /// current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Override the home directory (default: $HOME)
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Deployment plan file (default: <root>/deploy.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Behaviour switches carried into the deployment context.
    #[must_use]
    pub const fn options(&self) -> Options {
        Options {
            quiet: self.quiet,
            overwrite: self.overwrite,
            uninstall: self.uninstall,
        }
    }
}
