//! Vim and Neovim configuration checkouts plus their compatibility links.
//!
//! The checkouts are never deleted: under uninstall only the links go away,
//! so spell files and other editor state survive.
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use super::link::SymlinkResource;
use super::repo::{RepoResource, UninstallPolicy};
use super::Applicable;
use crate::context::Context;

/// Where the editor configuration lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorLayout {
    /// Neovim config in `$XDG_CONFIG_HOME/nvim`, optional vim config in
    /// `$XDG_CONFIG_HOME/vim` linked from `~/.vim` and `~/.vimrc`.
    #[default]
    Neovim,
    /// A single vim config in `~/.vim`, shared with Neovim through
    /// `$XDG_CONFIG_HOME/nvim`.
    Vim,
}

/// Deploy the Neovim configuration and, if given, a vim configuration next
/// to it.
///
/// # Errors
///
/// Propagates link conflicts and checkout inspection failures.
pub fn deploy_neovim(
    ctx: &Context,
    neovim_url: &str,
    vim_url: Option<&str>,
    branch: &str,
) -> Result<()> {
    let vimdir = ctx.config_home.join("vim");
    if let Some(vim_url) = vim_url {
        checkout(ctx, vim_url, vimdir.clone(), branch)?;
        link_if_present(ctx, vimdir.join("init.vim"), ctx.home.join(".vimrc"), false)?;
        link_if_present(ctx, vimdir, ctx.home.join(".vim"), true)?;
    }
    checkout(ctx, neovim_url, ctx.config_home.join("nvim"), branch)
}

/// Deploy a vim configuration into `~/.vim` and point Neovim at it.
///
/// # Errors
///
/// Propagates link conflicts and checkout inspection failures.
pub fn deploy_vim(ctx: &Context, vim_url: &str, branch: &str) -> Result<()> {
    let vimdir = ctx.home.join(".vim");
    checkout(ctx, vim_url, vimdir.clone(), branch)?;
    link_if_present(ctx, vimdir.join("init.vim"), ctx.home.join(".vimrc"), false)?;
    link_if_present(ctx, vimdir, ctx.config_home.join("nvim"), true)
}

fn checkout(ctx: &Context, url: &str, dest: PathBuf, branch: &str) -> Result<()> {
    RepoResource::new(url, dest)
        .with_branch(branch)
        .with_policy(UninstallPolicy::No)
        .deploy(ctx)?;
    Ok(())
}

/// Link `target -> source` when `source` exists with the expected kind;
/// otherwise warn (only when installing).
fn link_if_present(ctx: &Context, source: PathBuf, target: PathBuf, is_dir: bool) -> Result<()> {
    let present = if is_dir {
        source.is_dir()
    } else {
        source.is_file()
    };
    if !present {
        if !ctx.opts.uninstall {
            ctx.log
                .warn(&format!("Cannot link to {}", source.display()));
        }
        return Ok(());
    }
    SymlinkResource::new(source, target).deploy(ctx)?;
    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::context::Options;
    use crate::context::test_helpers::{make_context, overwrite, uninstall};
    use crate::exec::test_helpers::MockExecutor;
    use crate::logging::test_helpers::CaptureLog;
    use crate::resources::fs::same_target;

    fn context_with(home: &Path, opts: Options, mock: MockExecutor) -> (Context, Arc<CaptureLog>) {
        let (ctx, log) = make_context(home, home, opts);
        (ctx.with_executor(Arc::new(mock)), log)
    }

    fn fake_checkout(dir: &Path) {
        git2::Repository::init(dir).unwrap();
        std::fs::write(dir.join("init.vim"), "set nocompatible").unwrap();
    }

    /// Responses for two fast-forward updates.
    fn two_updates() -> MockExecutor {
        MockExecutor::with_responses(vec![(true, ""); 4]).with_which()
    }

    #[test]
    fn vim_layout_links_vimrc_and_nvim() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        fake_checkout(&home.join(".vim"));
        let (ctx, _) = context_with(home, Options::default(), two_updates());

        deploy_vim(&ctx, "https://example.com/vimrc.git", "master").unwrap();

        assert!(same_target(&home.join(".vimrc"), &home.join(".vim/init.vim")));
        assert!(same_target(&home.join(".config/nvim"), &home.join(".vim")));
    }

    #[test]
    fn neovim_layout_with_vim_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        fake_checkout(&home.join(".config/vim"));
        std::fs::create_dir_all(home.join(".config/nvim")).unwrap();
        git2::Repository::init(home.join(".config/nvim")).unwrap();
        let (ctx, _) = context_with(home, Options::default(), two_updates());

        deploy_neovim(
            &ctx,
            "https://example.com/nvim.git",
            Some("https://example.com/vimrc.git"),
            "master",
        )
        .unwrap();

        assert!(same_target(&home.join(".vimrc"), &home.join(".config/vim/init.vim")));
        assert!(same_target(&home.join(".vim"), &home.join(".config/vim")));
    }

    #[test]
    fn overwrite_replaces_existing_vimrc() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        fake_checkout(&home.join(".vim"));
        std::fs::write(home.join(".vimrc"), "old").unwrap();
        let (ctx, _) = context_with(home, overwrite(), two_updates());

        deploy_vim(&ctx, "https://example.com/vimrc.git", "master").unwrap();

        assert!(same_target(&home.join(".vimrc"), &home.join(".vim/init.vim")));
    }

    #[test]
    fn missing_init_vim_warns() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        git2::Repository::init(home.join(".vim")).unwrap();
        let (ctx, log) = context_with(home, Options::default(), two_updates());

        deploy_vim(&ctx, "https://example.com/vimrc.git", "master").unwrap();

        assert!(!home.join(".vimrc").exists());
        assert!(log.contains("warn", "Cannot link to"));
    }

    #[test]
    fn uninstall_removes_links_but_keeps_checkout() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        fake_checkout(&home.join(".vim"));
        let (ctx, _) = context_with(home, Options::default(), two_updates());
        deploy_vim(&ctx, "https://example.com/vimrc.git", "master").unwrap();

        let (ctx, _) = context_with(home, uninstall(), MockExecutor::default());
        deploy_vim(&ctx, "https://example.com/vimrc.git", "master").unwrap();

        assert!(std::fs::symlink_metadata(home.join(".vimrc")).is_err());
        assert!(std::fs::symlink_metadata(home.join(".config/nvim")).is_err());
        assert!(home.join(".vim/init.vim").is_file());
    }
}
