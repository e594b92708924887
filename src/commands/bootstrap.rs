//! Cleanup of one-shot bootstrap files once the run is over.
use std::path::{Path, PathBuf};

use crate::resources::fs;

/// Deletes the configured bootstrap files when dropped, whatever the outcome
/// of the run. Removal errors are ignored.
#[derive(Debug, Default)]
pub struct BootstrapCleanup {
    paths: Vec<PathBuf>,
}

impl BootstrapCleanup {
    /// Guard for `paths`, each relative to `root` unless absolute.
    #[must_use]
    pub fn new(root: &Path, paths: &[PathBuf]) -> Self {
        Self {
            paths: paths.iter().map(|p| root.join(p)).collect(),
        }
    }

    /// Guard for the `[bootstrap] remove_on_exit` list of the plan at
    /// `config_path`.
    ///
    /// Only that key is read, so the cleanup still happens when the rest of
    /// the plan fails to load. An unreadable file or malformed TOML yields an
    /// empty guard.
    #[must_use]
    pub fn from_plan(root: &Path, config_path: &Path) -> Self {
        let table = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|text| toml::from_str::<toml::Table>(&text).ok())
            .unwrap_or_default();
        let paths: Vec<PathBuf> = table
            .get("bootstrap")
            .and_then(|section| section.get("remove_on_exit"))
            .and_then(toml::Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(toml::Value::as_str)
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();
        Self::new(root, &paths)
    }

    /// Paths that will be removed on drop.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for BootstrapCleanup {
    fn drop(&mut self) {
        for path in &self.paths {
            if std::fs::symlink_metadata(path).is_ok() {
                tracing::debug!("removing bootstrap file {}", path.display());
                let _ = fs::remove_path(path);
            }
        }
    }
}
