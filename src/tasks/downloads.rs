//! Download tasks for `[[downloads]]` entries.
use anyhow::Result;

use super::{Task, TaskResult};
use crate::config::DownloadEntry;
use crate::context::Context;
use crate::resources::download::get;

/// Fetch one helper file into home.
#[derive(Debug)]
pub struct DownloadFile {
    name: String,
    entry: DownloadEntry,
}

impl DownloadFile {
    /// Task for a `[[downloads]]` entry.
    #[must_use]
    pub fn new(entry: DownloadEntry) -> Self {
        Self {
            name: format!("Download {}", entry.dest.display()),
            entry,
        }
    }
}

impl Task for DownloadFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        Ok(get(ctx, &self.entry.url, &self.entry.dest, self.entry.executable)?.into())
    }
}
