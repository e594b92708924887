//! Self-update of the dotfiles checkout.
use anyhow::Result;

use super::{Task, TaskResult};
use crate::context::Context;
use crate::resources::repo::git_update;

/// Fast-forward the dotfiles checkout itself before deploying from it.
#[derive(Debug)]
pub struct UpdateDotfiles;

impl Task for UpdateDotfiles {
    fn name(&self) -> &'static str {
        "Update dotfiles"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.root.join(".git").exists()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        Ok(git_update(ctx, &ctx.root).into())
    }
}
