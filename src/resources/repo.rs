//! Git checkout deployment and fast-forward updates.
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{Applicable, ResourceChange, fs};
use crate::context::Context;
use crate::error::RepoError;

/// Default branch checked out after cloning.
pub const DEFAULT_BRANCH: &str = "master";

/// Commands run, in order, to bring a checkout up to date.
const UPDATE_STEPS: [&[&str]; 2] = [&["remote", "update", "-p"], &["merge", "--ff-only", "@{u}"]];

/// When an existing checkout may be deleted under uninstall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UninstallPolicy {
    /// Only when the working tree has no changes, untracked files included.
    #[default]
    Clean,
    /// Always.
    Dirty,
    /// Never.
    No,
}

/// What is currently at a checkout destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing exists at the path.
    Absent,
    /// A checkout without local changes.
    Clean,
    /// A checkout with modified, staged or untracked files.
    Dirty,
    /// Something exists that is not a git checkout.
    NotACheckout,
}

/// A git repository that should be checked out at `dest`.
#[derive(Debug, Clone)]
pub struct RepoResource {
    /// Remote URL.
    pub url: String,
    /// Absolute checkout path.
    pub dest: PathBuf,
    /// Branch checked out after cloning.
    pub branch: String,
    /// Uninstall policy.
    pub allow_uninstall: UninstallPolicy,
}

impl RepoResource {
    /// Checkout of `url` at `dest` on the default branch with the `clean`
    /// uninstall policy.
    #[must_use]
    pub fn new(url: impl Into<String>, dest: PathBuf) -> Self {
        Self {
            url: url.into(),
            dest,
            branch: DEFAULT_BRANCH.to_string(),
            allow_uninstall: UninstallPolicy::default(),
        }
    }

    /// Set the branch checked out after cloning.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the uninstall policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: UninstallPolicy) -> Self {
        self.allow_uninstall = policy;
        self
    }

    /// Inspect the destination with libgit2.
    ///
    /// # Errors
    ///
    /// Returns an error if a `.git` entry exists but the repository cannot be
    /// opened or its status read.
    pub fn inspect(&self) -> Result<CheckoutState> {
        if std::fs::symlink_metadata(&self.dest).is_err() {
            return Ok(CheckoutState::Absent);
        }
        if !self.dest.join(".git").exists() {
            return Ok(CheckoutState::NotACheckout);
        }
        let repo = git2::Repository::open(&self.dest)
            .with_context(|| format!("opening repository {}", self.dest.display()))?;
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(true);
        let statuses = repo
            .statuses(Some(&mut opts))
            .with_context(|| format!("reading status of {}", self.dest.display()))?;
        Ok(if statuses.is_empty() {
            CheckoutState::Clean
        } else {
            CheckoutState::Dirty
        })
    }

    fn clone_fresh(&self, ctx: &Context) -> Result<ResourceChange> {
        let Some(git) = ctx.executor.which("git") else {
            ctx.log.warn(&format!(
                "git is not available, {} not cloned",
                self.dest.display()
            ));
            return Ok(skipped("git not found"));
        };
        let git = git.to_string_lossy();

        if !check_remote_repo(ctx, &git, &self.url) {
            return Ok(skipped("remote not accessible"));
        }

        let parent = self.dest.parent().unwrap_or_else(|| Path::new("/"));
        fs::mkdir_p(parent, ctx.interactive())?;

        let dest = self.dest.to_string_lossy();
        ctx.log.info(&format!("git clone {} {dest}", self.url));
        let result = ctx
            .executor
            .run_in_unchecked(parent, &git, &["clone", self.url.as_str(), &*dest])?;
        if !result.success {
            warn_nonzero(ctx, result.code);
            return Ok(skipped("clone failed"));
        }

        ctx.log.info(&format!("git checkout {}", self.branch));
        let result = ctx
            .executor
            .run_in_unchecked(&self.dest, &git, &["checkout", self.branch.as_str()])?;
        if !result.success {
            warn_nonzero(ctx, result.code);
        }
        Ok(ResourceChange::Applied)
    }

    fn delete(&self, ctx: &Context) -> Result<ResourceChange> {
        ctx.log
            .info(&format!("removing {}", self.dest.display()));
        fs::remove_path(&self.dest)?;
        Ok(ResourceChange::Applied)
    }
}

impl Applicable for RepoResource {
    fn description(&self) -> String {
        format!("{} ({})", self.dest.display(), self.url)
    }

    fn apply(&self, ctx: &Context) -> Result<ResourceChange> {
        match self.inspect()? {
            CheckoutState::Absent => self.clone_fresh(ctx),
            CheckoutState::Clean | CheckoutState::Dirty => Ok(git_update(ctx, &self.dest)),
            CheckoutState::NotACheckout if ctx.opts.overwrite => {
                fs::remove_path(&self.dest)?;
                self.clone_fresh(ctx)
            }
            CheckoutState::NotACheckout => {
                ctx.log.warn(&format!(
                    "{} already exists and will not be overwritten without the --overwrite option",
                    self.dest.display()
                ));
                Ok(skipped("destination exists"))
            }
        }
    }

    fn remove(&self, ctx: &Context) -> Result<ResourceChange> {
        let state = self.inspect()?;
        match (state, self.allow_uninstall) {
            (CheckoutState::Absent, _) => Ok(ResourceChange::AlreadyCorrect),
            (CheckoutState::NotACheckout, _) => {
                ctx.log.warn(&format!(
                    "{} cannot be uninstalled (not a git checkout)",
                    self.dest.display()
                ));
                Ok(skipped("not a git checkout"))
            }
            (_, UninstallPolicy::No) => {
                ctx.log
                    .debug(&format!("keeping checkout {}", self.dest.display()));
                Ok(skipped("uninstall not allowed"))
            }
            (CheckoutState::Dirty, UninstallPolicy::Clean) => Err(RepoError::DirtyCheckout {
                path: self.dest.clone(),
            }
            .into()),
            _ => self.delete(ctx),
        }
    }
}

/// Clone, update, or remove the checkout of `url` at `dest` (relative to
/// home).
///
/// # Errors
///
/// Returns [`RepoError::DirtyCheckout`] when uninstall is refused, or an I/O
/// error.
pub fn deploy_repo(
    ctx: &Context,
    url: &str,
    dest: &Path,
    branch: &str,
    allow_uninstall: UninstallPolicy,
) -> Result<ResourceChange> {
    RepoResource::new(url, fs::absolute(&ctx.home_path(dest))?)
        .with_branch(branch)
        .with_policy(allow_uninstall)
        .deploy(ctx)
}

/// Fast-forward the checkout at `folder` to its upstream.
///
/// Never fails: a missing `git`, a failing step, or a spawn error is logged
/// as a warning and reported as skipped.
pub fn git_update(ctx: &Context, folder: &Path) -> ResourceChange {
    let Some(git) = ctx.executor.which("git") else {
        ctx.log.warn(&format!(
            "git is not available, {} not updated",
            folder.display()
        ));
        return skipped("git not found");
    };
    let git = git.to_string_lossy();

    ctx.log
        .info(&format!("updating {}", folder.display()));
    let mut ok = true;
    for args in UPDATE_STEPS {
        ctx.log.debug(&format!("git {}", args.join(" ")));
        match ctx.executor.run_in_unchecked(folder, &git, args) {
            Ok(result) if result.success => {}
            Ok(result) => {
                warn_nonzero(ctx, result.code);
                ok = false;
            }
            Err(e) => {
                ctx.log.warn(&format!("{e:#}"));
                ok = false;
            }
        }
    }

    if ok {
        ResourceChange::Applied
    } else {
        skipped("update failed")
    }
}

/// `true` if `git ls-remote` can reach `url`; warns otherwise.
fn check_remote_repo(ctx: &Context, git: &str, url: &str) -> bool {
    let reachable = ctx
        .executor
        .run_unchecked(git, &["ls-remote", url])
        .is_ok_and(|r| r.success);
    if !reachable {
        ctx.log.warn(&format!(
            "repo {url} is not accessible. Check your authentication"
        ));
    }
    reachable
}

fn warn_nonzero(ctx: &Context, code: Option<i32>) {
    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    ctx.log
        .warn(&format!("git returned nonzero exit status ({code})"));
}

fn skipped(reason: &str) -> ResourceChange {
    ResourceChange::Skipped {
        reason: reason.to_string(),
    }
}
