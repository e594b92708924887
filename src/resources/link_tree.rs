//! Recursive link engine: mirrors a source folder into home as symlinks.
use anyhow::{Context as _, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::link::SymlinkResource;
use super::manifest::Manifest;
use super::{Applicable, ResourceChange, fs};
use crate::context::Context;
use crate::error::LinkError;

/// Names skipped when no ignore list is configured.
pub const DEFAULT_IGNORE: &[&str] = &[".DS_Store", "*~"];

/// Compiled set of shell-style name patterns.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    set: GlobSet,
}

impl IgnoreSet {
    /// Compile `patterns`. They are matched against single entry names, so
    /// `*` never crosses a path separator.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid ignore pattern: {pattern}"))?;
            builder.add(glob);
        }
        Ok(Self {
            set: builder.build().context("building ignore set")?,
        })
    }

    /// `true` if `name` matches any pattern.
    #[must_use]
    pub fn is_match(&self, name: &OsStr) -> bool {
        self.set.is_match(Path::new(name))
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in DEFAULT_IGNORE {
            if let Ok(glob) = GlobBuilder::new(pattern).literal_separator(true).build() {
                builder.add(glob);
            }
        }
        Self {
            set: builder.build().unwrap_or_else(|_| GlobSet::empty()),
        }
    }
}

/// What a [`LinkTree::deploy`] pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Links created.
    pub linked: usize,
    /// Links that already pointed at their source.
    pub unchanged: usize,
    /// Links removed under uninstall.
    pub removed: usize,
    /// Links from the previous manifest whose source entry is gone.
    pub pruned: usize,
    /// Whether the manifest file was (re)written.
    pub manifest_written: bool,
}

/// A source folder mirrored into a directory under home.
#[derive(Debug, Clone)]
pub struct LinkTree {
    /// Folder relative to the source root.
    pub folder: PathBuf,
    /// Destination relative to home (`.` for home itself).
    pub target: PathBuf,
    /// Descend into sub-folders; when `false` they are skipped.
    pub recursive: bool,
    /// Entry names never linked, at any depth.
    pub ignore: IgnoreSet,
}

impl LinkTree {
    /// Mirror `folder` into home with the default ignore list.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            target: PathBuf::from("."),
            recursive: true,
            ignore: IgnoreSet::default(),
        }
    }

    /// Link (or, under uninstall, unlink) every entry and record the
    /// manifest.
    ///
    /// The manifest lists every destination that points at its source after
    /// this pass. It is written even when the walk fails part-way, so links
    /// created before the failure are still tracked.
    ///
    /// After a complete walk, links recorded by the previous manifest that
    /// point into this folder at an entry that no longer exists are removed.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] for unresolved conflicts and unsupported
    /// entries, or an I/O error.
    pub fn deploy(&self, ctx: &Context) -> Result<LinkReport> {
        let mut report = LinkReport::default();
        let mut entries = Vec::new();
        let target = if self.target == Path::new(".") {
            PathBuf::new()
        } else {
            self.target.clone()
        };

        let manifest = Manifest::for_folder(&ctx.root, &self.folder);
        let previous = manifest.read()?;

        let walked = self
            .walk(ctx, &self.folder, &target, &mut report, &mut entries)
            .and_then(|()| self.prune(ctx, &previous, &entries, &mut report));

        let written = manifest.write(&entries);
        walked?;
        report.manifest_written = written?;
        if report.manifest_written {
            ctx.log
                .debug(&format!("wrote {}", manifest.path().display()));
        }
        Ok(report)
    }

    fn walk(
        &self,
        ctx: &Context,
        folder: &Path,
        target: &Path,
        report: &mut LinkReport,
        entries: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let dir = ctx.source_path(folder);
        let mut names = std::fs::read_dir(&dir)
            .with_context(|| format!("reading directory {}", dir.display()))?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("reading entries of {}", dir.display()))?;
        names.sort();

        for name in names {
            if self.ignore.is_match(&name) {
                ctx.log
                    .debug(&format!("ignoring {}", dir.join(&name).display()));
                continue;
            }
            let path = dir.join(&name);
            let src = folder.join(&name);
            let dst = target.join(&name);

            if path.is_file() || (fs::is_file_or_link(&path) && !path.is_dir()) {
                self.link_entry(ctx, &src, &dst, report, entries)?;
            } else if path.is_dir() {
                if self.recursive {
                    self.walk(ctx, &src, &dst, report, entries)?;
                }
            } else {
                return Err(LinkError::UnsupportedEntry { path }.into());
            }
        }
        Ok(())
    }

    fn prune(
        &self,
        ctx: &Context,
        previous: &[PathBuf],
        entries: &[PathBuf],
        report: &mut LinkReport,
    ) -> Result<()> {
        let source_dir = fs::absolute(&ctx.source_path(&self.folder))?;
        for stale in previous.iter().filter(|p| !entries.contains(p)) {
            let Ok(text) = std::fs::read_link(stale) else {
                continue;
            };
            let parent = stale.parent().unwrap_or_else(|| Path::new("/"));
            let source = fs::normalize(&parent.join(text));
            if !source.starts_with(&source_dir) || fs::is_file_or_link(&source) {
                continue;
            }
            ctx.log
                .info(&format!("removing stale link {}", stale.display()));
            fs::remove_path(stale)?;
            fs::prune_empty_parents(parent, &ctx.home);
            report.pruned += 1;
        }
        Ok(())
    }

    fn link_entry(
        &self,
        ctx: &Context,
        src: &Path,
        dst: &Path,
        report: &mut LinkReport,
        entries: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let link = SymlinkResource::resolve(ctx, src, dst)?;
        let change = link.deploy(ctx)?;
        match (ctx.opts.uninstall, change) {
            (true, ResourceChange::Applied) => report.removed += 1,
            (true, _) => {}
            (false, ResourceChange::Applied) => {
                report.linked += 1;
                entries.push(link.target);
            }
            (false, ResourceChange::AlreadyCorrect) => {
                report.unchanged += 1;
                entries.push(link.target);
            }
            (false, ResourceChange::Skipped { .. }) => {}
        }
        Ok(())
    }
}

/// Mirror `folder` (relative to the source root) into `target` (relative to
/// home).
///
/// # Errors
///
/// See [`LinkTree::deploy`].
pub fn make_links(
    ctx: &Context,
    folder: &Path,
    target: &Path,
    recursive: bool,
    ignore: &IgnoreSet,
) -> Result<LinkReport> {
    LinkTree {
        folder: folder.to_path_buf(),
        target: target.to_path_buf(),
        recursive,
        ignore: ignore.clone(),
    }
    .deploy(ctx)
}
