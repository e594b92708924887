//! The deploy run: load the plan, execute its tasks, report.
use anyhow::Result;
use std::sync::Arc;

use super::bootstrap::BootstrapCleanup;
use super::{resolve_config, resolve_root};
use crate::cli::{Cli, VERSION};
use crate::config::Config;
use crate::config::validation::validate;
use crate::context::Context;
use crate::logging::Logger;
use crate::prompt::AlwaysAllow;
use crate::tasks;

/// Run a full deployment (or uninstall) as described by `cli`.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded, the context cannot be
/// built, or one or more tasks failed.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    let root = resolve_root(cli.root.as_deref())?;
    let config_path = resolve_config(&root, cli.config.as_deref());

    log.debug(&format!("dotfiles-deploy {VERSION}"));
    log.stage("Loading configuration");
    let _cleanup = BootstrapCleanup::from_plan(&root, &config_path);
    let config = Config::load(&config_path)?;
    log.debug(&format!(
        "{} link folders, {} repos, {} downloads",
        config.links.len(),
        config.repos.len(),
        config.downloads.len()
    ));

    let warnings = validate(&config, &root);
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!("  {warning}"));
        }
    }

    let mut ctx = Context::from_env(root, cli.home.clone(), cli.options(), log.clone())?;
    if cli.yes {
        ctx = ctx.with_confirm(Arc::new(AlwaysAllow));
    }
    log.debug(&format!(
        "root: {}, home: {}",
        ctx.root.display(),
        ctx.home.display()
    ));

    let failures = deploy(&ctx, &config)?;
    log.print_summary();

    if failures > 0 {
        anyhow::bail!("{failures} task(s) failed");
    }
    Ok(())
}

/// Plan and run every task for `config`, returning the number of failures.
///
/// # Errors
///
/// Returns an error if the plan itself is invalid (bad ignore pattern).
pub fn deploy(ctx: &Context, config: &Config) -> Result<usize> {
    let tasks = tasks::plan(config)?;
    Ok(tasks::run_all(&tasks, ctx))
}
