//! `dotfiles-deploy` binary entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use dotfiles_deploy::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(
        logging::Verbosity::from_flags(args.quiet, args.verbose),
        "deploy",
    );
    let log = Arc::new(logging::Logger::new("deploy", args.quiet));

    commands::deploy::run(&args, &log)
}
