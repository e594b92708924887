//! Auxiliary checkout and editor configuration tasks.
use anyhow::Result;

use super::{Task, TaskResult};
use crate::config::{EditorSection, RepoEntry};
use crate::context::Context;
use crate::resources::editor::{EditorLayout, deploy_neovim, deploy_vim};
use crate::resources::repo::deploy_repo;

/// Clone or update one auxiliary checkout.
#[derive(Debug)]
pub struct DeployRepository {
    name: String,
    entry: RepoEntry,
}

impl DeployRepository {
    /// Task for a `[[repos]]` entry.
    #[must_use]
    pub fn new(entry: RepoEntry) -> Self {
        Self {
            name: format!("Deploy {}", entry.dest.display()),
            entry,
        }
    }
}

impl Task for DeployRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let change = deploy_repo(
            ctx,
            &self.entry.url,
            &self.entry.dest,
            &self.entry.branch,
            self.entry.allow_uninstall,
        )?;
        Ok(change.into())
    }
}

/// Deploy the editor configuration for the selected layout.
#[derive(Debug)]
pub struct DeployEditor {
    section: EditorSection,
}

impl DeployEditor {
    /// Task for the `[editor]` section.
    #[must_use]
    pub const fn new(section: EditorSection) -> Self {
        Self { section }
    }
}

impl Task for DeployEditor {
    fn name(&self) -> &'static str {
        match self.section.layout {
            EditorLayout::Neovim => "Deploy neovim config",
            EditorLayout::Vim => "Deploy vim config",
        }
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        match self.section.layout {
            EditorLayout::Neovim => self.section.neovim.is_some(),
            EditorLayout::Vim => self.section.vim.is_some(),
        }
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let branch = &self.section.branch;
        match (self.section.layout, &self.section.neovim, &self.section.vim) {
            (EditorLayout::Neovim, Some(neovim), vim) => {
                deploy_neovim(ctx, neovim, vim.as_deref(), branch)?;
            }
            (EditorLayout::Vim, _, Some(vim)) => deploy_vim(ctx, vim, branch)?,
            _ => return Ok(TaskResult::Skipped("no repository configured".to_string())),
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use super::*;
    use crate::context::Options;
    use crate::context::test_helpers::{make_context, uninstall};
    use crate::error::RepoError;
    use crate::exec::test_helpers::MockExecutor;
    use crate::resources::repo::UninstallPolicy;

    fn section(layout: EditorLayout, neovim: Option<&str>, vim: Option<&str>) -> EditorSection {
        EditorSection {
            layout,
            neovim: neovim.map(String::from),
            vim: vim.map(String::from),
            branch: "master".to_string(),
        }
    }

    #[test]
    fn editor_requires_url_for_layout() {
        let (ctx, _) = make_context(Path::new("/d"), Path::new("/h"), Options::default());
        assert!(!DeployEditor::new(section(EditorLayout::Neovim, None, Some("v"))).should_run(&ctx));
        assert!(DeployEditor::new(section(EditorLayout::Vim, None, Some("v"))).should_run(&ctx));
        assert_eq!(
            DeployEditor::new(section(EditorLayout::Vim, None, None)).name(),
            "Deploy vim config"
        );
    }

    #[test]
    fn dirty_checkout_fails_repository_task() {
        let tmp = tempfile::tempdir().unwrap();
        git2::Repository::init(tmp.path().join(".mutt")).unwrap();
        std::fs::write(tmp.path().join(".mutt/local"), "x").unwrap();
        let (ctx, _) = make_context(tmp.path(), tmp.path(), uninstall());
        let ctx = ctx.with_executor(Arc::new(MockExecutor::default()));
        let task = DeployRepository::new(RepoEntry {
            url: "git@example.com:mutt.git".to_string(),
            dest: PathBuf::from(".mutt"),
            branch: "master".to_string(),
            allow_uninstall: UninstallPolicy::Clean,
        });
        assert_eq!(task.name(), "Deploy .mutt");
        let err = task.run(&ctx).unwrap_err();
        assert!(err.downcast_ref::<RepoError>().is_some());
    }
}
