//! Named deployment steps that wire the plan to resources.
pub mod downloads;
pub mod integrations;
pub mod links;
pub mod repos;
pub mod update;

use anyhow::Result;

use crate::config::Config;
use crate::context::Context;
use crate::logging::TaskStatus;
use crate::resources::ResourceChange;
use crate::resources::link_tree::IgnoreSet;

/// Outcome of a task that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// The task did its work (or found nothing to change).
    Ok,
    /// The task chose not to act.
    Skipped(String),
}

impl From<ResourceChange> for TaskResult {
    fn from(change: ResourceChange) -> Self {
        match change {
            ResourceChange::Applied | ResourceChange::AlreadyCorrect => Self::Ok,
            ResourceChange::Skipped { reason } => Self::Skipped(reason),
        }
    }
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current run.
    fn should_run(&self, ctx: &Context) -> bool {
        let _ = ctx;
        true
    }

    /// A failing critical task aborts every task after it.
    fn is_critical(&self) -> bool {
        false
    }

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying resource fails.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Build the ordered task list for `config`.
///
/// # Errors
///
/// Returns an error if an ignore pattern is invalid.
pub fn plan(config: &Config) -> Result<Vec<Box<dyn Task>>> {
    let ignore = IgnoreSet::new(&config.ignore)?;
    let mut tasks: Vec<Box<dyn Task>> = vec![Box::new(update::UpdateDotfiles)];

    for folder in &config.links {
        tasks.push(Box::new(links::LinkFolderTask::new(folder, ignore.clone())));
    }
    if let Some(editor) = &config.editor {
        tasks.push(Box::new(repos::DeployEditor::new(editor.clone())));
    }
    for repo in &config.repos {
        tasks.push(Box::new(repos::DeployRepository::new(repo.clone())));
    }
    for download in &config.downloads {
        tasks.push(Box::new(downloads::DownloadFile::new(download.clone())));
    }
    if let Some(handlers) = &config.handlers {
        tasks.push(Box::new(integrations::RegisterFileHandlers::new(
            handlers.file.clone(),
        )));
    }
    if let Some(crontab) = &config.crontab {
        tasks.push(Box::new(integrations::InstallCrontab::new(crontab.file.clone())));
    }
    Ok(tasks)
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) -> TaskStatus {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return TaskStatus::NotApplicable;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            TaskStatus::Ok
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            TaskStatus::Skipped
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            TaskStatus::Failed
        }
    }
}

/// Run `tasks` in order and return the number of failed tasks.
///
/// Once a critical task fails, the remaining tasks are recorded as aborted
/// without running.
pub fn run_all(tasks: &[Box<dyn Task>], ctx: &Context) -> usize {
    let mut failures = 0;
    let mut aborted = false;
    for task in tasks {
        if aborted {
            ctx.log.record_task(
                task.name(),
                TaskStatus::Aborted,
                Some("not run after a critical failure"),
            );
            continue;
        }
        if execute(task.as_ref(), ctx) == TaskStatus::Failed {
            failures += 1;
            if task.is_critical() {
                ctx.log
                    .error("critical task failed, remaining tasks are not run");
                aborted = true;
            }
        }
    }
    failures
}
