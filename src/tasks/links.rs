//! Link tasks for the `[[links]]` folders.
use anyhow::Result;

use super::{Task, TaskResult};
use crate::config::LinkFolder;
use crate::context::Context;
use crate::resources::link_tree::{IgnoreSet, LinkTree};

/// Mirror one source folder into home.
#[derive(Debug)]
pub struct LinkFolderTask {
    name: String,
    tree: LinkTree,
}

impl LinkFolderTask {
    /// Task for a `[[links]]` entry.
    #[must_use]
    pub fn new(folder: &LinkFolder, ignore: IgnoreSet) -> Self {
        let name = if folder.target.as_os_str() == "." {
            format!("Link {}", folder.folder.display())
        } else {
            format!(
                "Link {} into ~/{}",
                folder.folder.display(),
                folder.target.display()
            )
        };
        Self {
            name,
            tree: LinkTree {
                folder: folder.folder.clone(),
                target: folder.target.clone(),
                recursive: folder.recursive,
                ignore,
            },
        }
    }
}

impl Task for LinkFolderTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.source_path(&self.tree.folder).is_dir()
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = self.tree.deploy(ctx)?;
        if report.pruned > 0 {
            ctx.log
                .info(&format!("{} stale links removed", report.pruned));
        }
        if ctx.opts.uninstall {
            ctx.log.info(&format!("{} links removed", report.removed));
        } else {
            ctx.log.info(&format!(
                "{} links created, {} already in place",
                report.linked, report.unchanged
            ));
        }
        Ok(TaskResult::Ok)
    }
}
