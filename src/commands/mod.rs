//! Top-level commands and root/plan path resolution.
pub mod bootstrap;
pub mod deploy;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE;
use crate::resources::fs;

/// Resolve the dotfiles root: the explicit `--root`, else `DOTFILES_ROOT`,
/// else the current directory. The result is absolute.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let root = match explicit {
        Some(root) => root.to_path_buf(),
        None => match std::env::var_os("DOTFILES_ROOT") {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => std::env::current_dir()?,
        },
    };
    fs::absolute(&root)
}

/// The plan file: the explicit `--config`, else `<root>/deploy.toml`.
#[must_use]
pub fn resolve_config(root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| root.join(CONFIG_FILE), Path::to_path_buf)
}
