//! File handler and crontab registration tasks.
use anyhow::Result;
use std::path::PathBuf;

use super::{Task, TaskResult};
use crate::context::Context;
use crate::resources::integrations::{run_duti, set_crontab};
use crate::resources::ResourceChange;

/// Downgrade a failure to a warning and a skipped task.
fn warn_on_error(ctx: &Context, result: Result<ResourceChange>) -> TaskResult {
    match result {
        Ok(change) => change.into(),
        Err(e) => {
            ctx.log.warn(&format!("{e:#}"));
            TaskResult::Skipped(format!("{e:#}"))
        }
    }
}

/// Register file-type handlers with `duti`.
#[derive(Debug)]
pub struct RegisterFileHandlers {
    file: PathBuf,
}

impl RegisterFileHandlers {
    /// Task for the `[handlers]` section; `file` is relative to the root.
    #[must_use]
    pub const fn new(file: PathBuf) -> Self {
        Self { file }
    }
}

impl Task for RegisterFileHandlers {
    fn name(&self) -> &'static str {
        "Register file handlers"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.opts.uninstall
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        Ok(warn_on_error(ctx, run_duti(ctx, &ctx.source_path(&self.file))))
    }
}

/// Install (or clear) the user crontab.
#[derive(Debug)]
pub struct InstallCrontab {
    file: PathBuf,
}

impl InstallCrontab {
    /// Task for the `[crontab]` section; `file` is relative to home.
    #[must_use]
    pub const fn new(file: PathBuf) -> Self {
        Self { file }
    }
}

impl Task for InstallCrontab {
    fn name(&self) -> &'static str {
        "Set crontab"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        Ok(warn_on_error(ctx, set_crontab(ctx, &ctx.home_path(&self.file))))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::Options;
    use crate::context::test_helpers::{make_context, uninstall};
    use crate::exec::test_helpers::MockExecutor;

    #[test]
    fn handlers_skipped_under_uninstall() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _) = make_context(tmp.path(), tmp.path(), uninstall());
        assert!(!RegisterFileHandlers::new("handlers.duti".into()).should_run(&ctx));
    }

    #[test]
    fn duti_failure_becomes_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let mock = MockExecutor::with_responses(vec![(false, "")]).with_which();
        let (ctx, log) = make_context(tmp.path(), tmp.path(), Options::default());
        let ctx = ctx.with_executor(Arc::new(mock));
        let result = RegisterFileHandlers::new("handlers.duti".into())
            .run(&ctx)
            .unwrap();
        assert!(matches!(result, TaskResult::Skipped(_)));
        assert!(log.contains("warn", "duti returned nonzero exit status"));
    }

    #[test]
    fn crontab_path_expands_home() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".crontab"), "@daily true\n").unwrap();
        let mock = Arc::new(MockExecutor::with_responses(vec![(true, "")]).with_which());
        let (ctx, _) = make_context(tmp.path(), tmp.path(), Options::default());
        let ctx = ctx.with_executor(mock.clone());
        let result = InstallCrontab::new("~/.crontab".into()).run(&ctx).unwrap();
        assert_eq!(result, TaskResult::Ok);
        assert_eq!(
            mock.calls(),
            vec![format!("/usr/bin/crontab {}", tmp.path().join(".crontab").display())]
        );
    }
}
