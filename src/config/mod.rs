//! Deployment plan loaded from `deploy.toml`.
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::resources::editor::EditorLayout;
use crate::resources::link_tree::DEFAULT_IGNORE;
use crate::resources::repo::{DEFAULT_BRANCH, UninstallPolicy};

/// Name of the plan file looked up in the source root.
pub const CONFIG_FILE: &str = "deploy.toml";

/// Everything a run deploys, in the order the sections are processed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Entry-name globs skipped by every link folder.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// Source folders mirrored into home.
    #[serde(default = "default_links")]
    pub links: Vec<LinkFolder>,
    /// Editor configuration checkouts.
    #[serde(default)]
    pub editor: Option<EditorSection>,
    /// Auxiliary git checkouts.
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
    /// Single-file downloads.
    #[serde(default)]
    pub downloads: Vec<DownloadEntry>,
    /// File-type handler registration.
    #[serde(default)]
    pub handlers: Option<FileSection>,
    /// User crontab.
    #[serde(default)]
    pub crontab: Option<FileSection>,
    /// Files removed from the root when the run ends.
    #[serde(default)]
    pub bootstrap: BootstrapSection,
}

/// A `[[links]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkFolder {
    /// Folder relative to the source root.
    pub folder: PathBuf,
    /// Destination relative to home.
    #[serde(default = "default_target")]
    pub target: PathBuf,
    /// Descend into sub-folders.
    #[serde(default = "default_true")]
    pub recursive: bool,
}

/// The `[editor]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorSection {
    /// Which directory layout to deploy.
    #[serde(default)]
    pub layout: EditorLayout,
    /// Neovim configuration repository.
    #[serde(default)]
    pub neovim: Option<String>,
    /// Vim configuration repository.
    #[serde(default)]
    pub vim: Option<String>,
    /// Branch checked out after cloning.
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// A `[[repos]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoEntry {
    /// Remote URL.
    pub url: String,
    /// Checkout path relative to home.
    pub dest: PathBuf,
    /// Branch checked out after cloning.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// When the checkout may be removed under uninstall.
    #[serde(default)]
    pub allow_uninstall: UninstallPolicy,
}

/// A `[[downloads]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadEntry {
    /// Source URL.
    pub url: String,
    /// Destination relative to home.
    pub dest: PathBuf,
    /// Add execute permission after downloading.
    #[serde(default)]
    pub executable: bool,
}

/// A section naming a single file (`[handlers]`, `[crontab]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSection {
    /// The file path.
    pub file: PathBuf,
}

/// The `[bootstrap]` section.
///
/// Checked with the rest of the plan. The cleanup guard reads the list on
/// its own through [`BootstrapCleanup::from_plan`](crate::commands::bootstrap::BootstrapCleanup::from_plan).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapSection {
    /// Paths relative to the root deleted when the run ends.
    #[serde(default)]
    pub remove_on_exit: Vec<PathBuf>,
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| (*s).to_string()).collect()
}

fn default_links() -> Vec<LinkFolder> {
    vec![LinkFolder {
        folder: PathBuf::from("HOME"),
        target: default_target(),
        recursive: true,
    }]
}

fn default_target() -> PathBuf {
    PathBuf::from(".")
}

const fn default_true() -> bool {
    true
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            links: default_links(),
            editor: None,
            repos: Vec::new(),
            downloads: Vec::new(),
            handlers: None,
            crontab: None,
            bootstrap: BootstrapSection::default(),
        }
    }
}

impl Config {
    /// Load the plan from `path`. A missing file yields the default plan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid plan.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
                .into());
            }
        };
        Self::parse(&content, path)
    }

    /// Parse plan text; `origin` only labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on invalid TOML or schema mismatches.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(config)
    }
}
