//! Non-fatal checks on a loaded plan, reported as warnings before deploying.
use std::path::Path;

use super::Config;
use crate::resources::editor::EditorLayout;

/// A problem found in the plan that does not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Plan section (e.g. `links`, `editor`).
    pub source: String,
    /// The entry that triggered the warning.
    pub item: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationWarning {
    /// Warning about `item` in the plan section `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.source, self.item, self.message)
    }
}

/// Check `config` against the source tree at `root`.
#[must_use]
pub fn validate(config: &Config, root: &Path) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for link in &config.links {
        let folder = root.join(&link.folder);
        if !folder.is_dir() {
            warnings.push(ValidationWarning::new(
                "links",
                link.folder.display().to_string(),
                format!("folder {} does not exist", folder.display()),
            ));
        }
        if link.folder.is_absolute() {
            warnings.push(ValidationWarning::new(
                "links",
                link.folder.display().to_string(),
                "folder should be relative to the dotfiles root",
            ));
        }
    }

    if let Some(editor) = &config.editor {
        let missing = match editor.layout {
            EditorLayout::Neovim if editor.neovim.is_none() => Some("neovim"),
            EditorLayout::Vim if editor.vim.is_none() => Some("vim"),
            _ => None,
        };
        if let Some(key) = missing {
            warnings.push(ValidationWarning::new(
                "editor",
                key,
                format!("layout requires a '{key}' repository URL; editor is skipped"),
            ));
        }
    }

    for repo in &config.repos {
        if repo.url.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                "repos",
                repo.dest.display().to_string(),
                "empty repository URL",
            ));
        }
    }

    for download in &config.downloads {
        if !(download.url.starts_with("http://") || download.url.starts_with("https://")) {
            warnings.push(ValidationWarning::new(
                "downloads",
                download.dest.display().to_string(),
                format!("URL {} is not http(s)", download.url),
            ));
        }
    }

    if let Some(handlers) = &config.handlers
        && !root.join(&handlers.file).is_file()
    {
        warnings.push(ValidationWarning::new(
            "handlers",
            handlers.file.display().to_string(),
            "handlers file does not exist",
        ));
    }

    warnings
}
