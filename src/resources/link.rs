//! Single relative symlink from the home directory into the source tree.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState, fs};
use crate::context::Context;
use crate::error::LinkError;

/// A symlink resource that can be checked, applied and removed.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// Absolute path inside the source tree (what the link points to).
    pub source: PathBuf,
    /// Absolute path where the link lives.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource from absolute paths.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Resolve `src` against the source root and `dst` against home.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is needed and unavailable.
    pub fn resolve(ctx: &Context, src: &Path, dst: &Path) -> Result<Self> {
        Ok(Self::new(
            fs::absolute(&ctx.source_path(src))?,
            fs::absolute(&ctx.home_path(dst))?,
        ))
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self, ctx: &Context) -> Result<ResourceChange> {
        let state = self.current_state()?;
        if state == ResourceState::Correct {
            ctx.log
                .debug(&format!("{} already linked", self.target.display()));
            return Ok(ResourceChange::AlreadyCorrect);
        }

        ctx.log.info(&self.description());

        match state {
            ResourceState::Invalid { .. } if ctx.opts.overwrite && self.source.is_dir() => {
                std::fs::remove_dir_all(&self.target)
                    .with_context(|| format!("removing {}", self.target.display()))?;
            }
            ResourceState::Invalid { .. } => {
                return Err(LinkError::DirectoryConflict {
                    path: self.target.clone(),
                    source_path: self.source.clone(),
                }
                .into());
            }
            ResourceState::Incorrect { .. } if ctx.opts.overwrite => {
                remove_symlink(&self.target)?;
            }
            _ => {}
        }

        let parent = self.target.parent().unwrap_or_else(|| Path::new("/"));
        fs::mkdir_p(parent, ctx.interactive())?;

        if fs::is_file_or_link(&self.target) {
            let question = format!("{} already exists. Overwrite?", self.target.display());
            if !ctx.interactive().is_some_and(|c| c.confirm(&question)) {
                return Err(LinkError::Conflict {
                    path: self.target.clone(),
                }
                .into());
            }
            remove_symlink(&self.target)?;
        }

        let relative = fs::relative_path(&self.source, parent);
        create_symlink(&relative, &self.target, self.source.is_dir())?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self, ctx: &Context) -> Result<ResourceChange> {
        let is_link = std::fs::symlink_metadata(&self.target).is_ok_and(|m| m.is_symlink());
        if !is_link || !fs::same_target(&self.target, &self.source) {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        ctx.log
            .info(&format!("removing {}", self.target.display()));
        remove_symlink(&self.target)?;
        if let Some(parent) = self.target.parent() {
            fs::prune_empty_parents(parent, &ctx.home);
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if fs::same_target(&self.target, &self.source) {
            return Ok(ResourceState::Correct);
        }
        let Ok(meta) = std::fs::symlink_metadata(&self.target) else {
            return Ok(ResourceState::Missing);
        };
        Ok(if meta.is_symlink() {
            let current = std::fs::read_link(&self.target)
                .with_context(|| format!("reading link {}", self.target.display()))?;
            ResourceState::Incorrect {
                current: format!("points to {}", current.display()),
            }
        } else if meta.is_dir() {
            ResourceState::Invalid {
                reason: "target is a real directory".to_string(),
            }
        } else {
            ResourceState::Incorrect {
                current: "target is a regular file".to_string(),
            }
        })
    }
}

/// Link `dst` (relative to home) to `src` (relative to the source root), or
/// undo that link under `uninstall`.
///
/// # Errors
///
/// Returns a [`LinkError`] on an unresolved conflict, or an I/O error.
pub fn make_link(ctx: &Context, src: &Path, dst: &Path) -> Result<ResourceChange> {
    SymlinkResource::resolve(ctx, src, dst)?.deploy(ctx)
}

/// Create a symlink at `link` whose content is `target`.
fn create_symlink(target: &Path, link: &Path, is_dir: bool) -> Result<()> {
    #[cfg(unix)]
    let result = {
        let _ = is_dir;
        std::os::unix::fs::symlink(target, link)
    };

    #[cfg(windows)]
    let result = if is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            target.display()
        )
    })
}

/// Remove a file or symlink. Directory symlinks on Windows need `remove_dir`.
fn remove_symlink(path: &Path) -> Result<()> {
    #[cfg(windows)]
    if path.is_dir() {
        return std::fs::remove_dir(path)
            .with_context(|| format!("removing link {}", path.display()));
    }
    std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
}
