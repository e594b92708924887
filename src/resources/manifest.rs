//! Per-folder manifest of created links, with one generation of history.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// The `.<folder>.links` file in the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    /// Manifest for `folder` (relative to `root`). Path separators in the
    /// folder name become `_`, so `HOME/sub` maps to `.HOME_sub.links`.
    #[must_use]
    pub fn for_folder(root: &Path, folder: &Path) -> Self {
        let name: String = folder
            .to_string_lossy()
            .chars()
            .map(|c| if std::path::is_separator(c) { '_' } else { c })
            .collect();
        Self {
            path: root.join(format!(".{name}.links")),
        }
    }

    /// Location of the current manifest.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the previous generation (`.<folder>.old_links`).
    #[must_use]
    pub fn old_path(&self) -> PathBuf {
        self.path.with_extension("old_links")
    }

    /// Entries of the current manifest; empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read(&self) -> Result<Vec<PathBuf>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(PathBuf::from).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => {
                Err(e).with_context(|| format!("reading manifest {}", self.path.display()))
            }
        }
    }

    /// Write `entries`, one per line, rotating the existing manifest to
    /// [`old_path`](Self::old_path) first.
    ///
    /// Returns `false` without touching the disk when the content would not
    /// change.
    ///
    /// # Errors
    ///
    /// Returns an error if the rotation or the write fails.
    pub fn write(&self, entries: &[PathBuf]) -> Result<bool> {
        let content: String = entries
            .iter()
            .map(|entry| format!("{}\n", entry.display()))
            .collect();

        if self.path.is_file() {
            let existing = std::fs::read_to_string(&self.path)
                .with_context(|| format!("reading manifest {}", self.path.display()))?;
            if existing == content {
                return Ok(false);
            }
            std::fs::rename(&self.path, self.old_path())
                .with_context(|| format!("rotating manifest {}", self.path.display()))?;
        }

        std::fs::write(&self.path, content)
            .with_context(|| format!("writing manifest {}", self.path.display()))?;
        Ok(true)
    }
}
