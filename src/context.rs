//! Explicit run context shared by every resource and task.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::prompt::{Confirm, ConsoleConfirm};
use crate::resources::download::{Fetcher, HttpFetcher};

/// The three orthogonal command-line switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Suppress progress messages and never prompt.
    pub quiet: bool,
    /// Replace conflicting files and links.
    pub overwrite: bool,
    /// Remove what a normal run would install.
    pub uninstall: bool,
}

/// Everything a deployment step needs, fixed once at start.
///
/// Replaces process-wide state: home and source root are plain fields, and
/// the side-effecting capabilities (commands, HTTP, prompts) are injectable.
pub struct Context {
    /// Root of the dotfiles checkout (the source tree).
    pub root: PathBuf,
    /// Home directory that links are created in.
    pub home: PathBuf,
    /// `$XDG_CONFIG_HOME`, defaulting to `~/.config`.
    pub config_home: PathBuf,
    /// Command-line switches.
    pub opts: Options,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// External command runner.
    pub executor: Arc<dyn Executor>,
    /// HTTP client used by the downloader.
    pub fetcher: Arc<dyn Fetcher>,
    /// Confirmation policy used in interactive mode.
    pub confirm: Arc<dyn Confirm>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.root)
            .field("home", &self.home)
            .field("config_home", &self.config_home)
            .field("opts", &self.opts)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("fetcher", &"<dyn Fetcher>")
            .field("confirm", &self.confirm)
            .finish()
    }
}

impl Context {
    /// Create a context with the production capabilities.
    ///
    /// `config_home` defaults to `<home>/.config`; use
    /// [`with_config_home`](Self::with_config_home) to override it.
    #[must_use]
    pub fn new(root: PathBuf, home: PathBuf, opts: Options, log: Arc<dyn Log>) -> Self {
        let config_home = home.join(".config");
        Self {
            root,
            home,
            config_home,
            opts,
            log,
            executor: Arc::new(SystemExecutor),
            fetcher: Arc::new(HttpFetcher),
            confirm: Arc::new(ConsoleConfirm),
        }
    }

    /// Create a context from the environment: `HOME` (unless `home` is
    /// given) and `XDG_CONFIG_HOME`.
    ///
    /// # Errors
    ///
    /// Returns an error if no home override is given and `HOME` is unset.
    pub fn from_env(
        root: PathBuf,
        home: Option<PathBuf>,
        opts: Options,
        log: Arc<dyn Log>,
    ) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))?,
        };
        let ctx = Self::new(root, home, opts, log);
        Ok(match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => ctx.with_config_home(PathBuf::from(dir)),
            _ => ctx,
        })
    }

    /// Replace the configuration directory.
    #[must_use]
    pub fn with_config_home(mut self, config_home: PathBuf) -> Self {
        self.config_home = config_home;
        self
    }

    /// Replace the command executor.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the HTTP fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the confirmation policy.
    #[must_use]
    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Resolve a path relative to the source root. Absolute paths pass through.
    #[must_use]
    pub fn source_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Resolve a path relative to home. Absolute paths pass through, and a
    /// leading `~/` is treated as home.
    #[must_use]
    pub fn home_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match path.strip_prefix("~") {
            Ok(rest) => self.home.join(rest),
            Err(_) => self.home.join(path),
        }
    }

    /// The confirmation policy, or `None` in quiet mode where prompting is
    /// not allowed.
    #[must_use]
    pub fn interactive(&self) -> Option<&dyn Confirm> {
        if self.opts.quiet {
            None
        } else {
            Some(self.confirm.as_ref())
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::test_helpers::make_context;
    use super::*;

    #[test]
    fn home_path_expands_tilde() {
        let (ctx, _) = make_context(Path::new("/dots"), Path::new("/home/u"), Options::default());
        assert_eq!(ctx.home_path("~/.crontab"), PathBuf::from("/home/u/.crontab"));
        assert_eq!(ctx.home_path(".vimrc"), PathBuf::from("/home/u/.vimrc"));
        assert_eq!(ctx.home_path("/etc/x"), PathBuf::from("/etc/x"));
    }

    #[test]
    fn source_path_joins_root() {
        let (ctx, _) = make_context(Path::new("/dots"), Path::new("/home/u"), Options::default());
        assert_eq!(ctx.source_path("HOME/.bashrc"), PathBuf::from("/dots/HOME/.bashrc"));
    }

    #[test]
    fn config_home_defaults_under_home() {
        let (ctx, _) = make_context(Path::new("/dots"), Path::new("/home/u"), Options::default());
        assert_eq!(ctx.config_home, PathBuf::from("/home/u/.config"));
        let ctx = ctx.with_config_home(PathBuf::from("/xdg"));
        assert_eq!(ctx.config_home, PathBuf::from("/xdg"));
    }

    #[test]
    fn quiet_disables_prompting() {
        let (ctx, _) = make_context(Path::new("/d"), Path::new("/h"), test_helpers::quiet());
        assert!(ctx.interactive().is_none());
        let (ctx, _) = make_context(Path::new("/d"), Path::new("/h"), Options::default());
        assert!(ctx.interactive().is_some());
    }

    #[test]
    fn debug_hides_capabilities() {
        let (ctx, _) = make_context(Path::new("/d"), Path::new("/h"), Options::default());
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("<dyn Executor>"));
    }
}
