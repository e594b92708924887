//! Filesystem helpers shared by the link engine and the downloader.
use anyhow::{Context as _, Result};
use std::path::{Component, Path, PathBuf};

use crate::error::LinkError;
use crate::prompt::Confirm;

/// `true` if `path` is a regular file or a symlink (dangling or not).
#[must_use]
pub fn is_file_or_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.is_file() || m.is_symlink())
}

/// `true` if `path` is a directory and not a symlink to one.
#[must_use]
pub fn is_real_dir(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
}

/// `true` if `a` is a link whose text names `b`, or if both paths exist and
/// resolve to the same location.
///
/// The lexical check keeps links into the source tree recognizable when the
/// source entry is itself a dangling link.
#[must_use]
pub fn same_target(a: &Path, b: &Path) -> bool {
    if let Ok(text) = std::fs::read_link(a) {
        let resolved = match a.parent() {
            Some(parent) if text.is_relative() => parent.join(&text),
            _ => text,
        };
        if normalize(&resolved) == normalize(b) {
            return true;
        }
    }
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Create `dir` and every missing ancestor.
///
/// An ancestor that exists as a file or link is a collision: with a
/// confirmation policy the user is asked whether to replace it with an empty
/// folder, otherwise (or on refusal) [`LinkError::NotADirectory`] is returned.
///
/// # Errors
///
/// Returns an error on an unresolved collision or an I/O failure.
pub fn mkdir_p(dir: &Path, confirm: Option<&dyn Confirm>) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    if is_file_or_link(dir) {
        let question = format!(
            "{} already exists as a file. Overwrite with an empty folder?",
            dir.display()
        );
        if !confirm.is_some_and(|c| c.confirm(&question)) {
            return Err(LinkError::NotADirectory {
                path: dir.to_path_buf(),
            }
            .into());
        }
        std::fs::remove_file(dir).with_context(|| format!("removing {}", dir.display()))?;
    } else if let Some(parent) = dir.parent() {
        mkdir_p(parent, confirm)?;
    }
    std::fs::create_dir(dir).with_context(|| format!("creating directory {}", dir.display()))
}

/// Remove a file, link, or whole directory tree.
///
/// # Errors
///
/// Returns an error if the path cannot be removed.
pub fn remove_path(path: &Path) -> Result<()> {
    if is_real_dir(path) {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
    .with_context(|| format!("removing {}", path.display()))
}

/// Remove empty directories starting at `dir` and walking upward.
///
/// Stops silently at the first directory that cannot be removed (not empty,
/// permission denied) and never removes `stop_at` itself.
pub fn prune_empty_parents(dir: &Path, stop_at: &Path) {
    let mut current = Some(dir);
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || dir == stop_at || std::fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}

/// Make `path` absolute against the current directory and resolve `.` and
/// `..` lexically.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("resolving absolute path of {}", path.display()))?;
    Ok(normalize(&path))
}

/// Resolve `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Express `target` relative to the directory `base`.
///
/// Both paths are normalized first; they should be absolute.
#[must_use]
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target = normalize(target);
    let base = normalize(base);
    let mut target_iter = target.components().peekable();
    let mut base_iter = base.components().peekable();

    while let (Some(t), Some(b)) = (target_iter.peek(), base_iter.peek()) {
        if t != b {
            break;
        }
        target_iter.next();
        base_iter.next();
    }

    let mut rel = PathBuf::new();
    for _ in base_iter {
        rel.push("..");
    }
    for component in target_iter {
        rel.push(component);
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}
