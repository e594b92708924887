//! Single-file downloads over HTTP(S).
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, ResourceChange, fs};
use crate::context::Context;
use crate::error::DownloadError;

/// Retrieves the body of a URL.
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Http`] on connection failures and non-success
    /// status codes.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] backed by a blocking `ureq` agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let http_error = |e: ureq::Error| DownloadError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let mut response = ureq::get(url).call().map_err(http_error)?;
        let body = response.body_mut().read_to_vec().map_err(http_error)?;
        Ok(body)
    }
}

/// A file under home whose content comes from a URL.
#[derive(Debug, Clone)]
pub struct DownloadResource {
    /// Source URL.
    pub url: String,
    /// Absolute destination path.
    pub dest: PathBuf,
    /// Add execute permission for everyone after writing.
    pub executable: bool,
}

impl DownloadResource {
    /// Create a download of `url` into `dest`.
    #[must_use]
    pub fn new(url: impl Into<String>, dest: PathBuf, executable: bool) -> Self {
        Self {
            url: url.into(),
            dest,
            executable,
        }
    }
}

impl Applicable for DownloadResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.url, self.dest.display())
    }

    fn apply(&self, ctx: &Context) -> Result<ResourceChange> {
        let parent = self.dest.parent().unwrap_or_else(|| Path::new("/"));
        fs::mkdir_p(parent, ctx.interactive())?;

        if fs::is_file_or_link(&self.dest) {
            if !ctx.opts.overwrite {
                return Err(DownloadError::AlreadyExists {
                    path: self.dest.clone(),
                }
                .into());
            }
            std::fs::remove_file(&self.dest)
                .with_context(|| format!("removing {}", self.dest.display()))?;
        } else if self.dest.is_dir() {
            return Err(DownloadError::IsDirectory {
                path: self.dest.clone(),
            }
            .into());
        }

        ctx.log.info(&self.description());
        let body = ctx.fetcher.fetch(&self.url)?;
        std::fs::write(&self.dest, body)
            .with_context(|| format!("writing {}", self.dest.display()))?;
        if self.executable {
            make_executable(&self.dest)?;
        }
        Ok(ResourceChange::Applied)
    }

    fn remove(&self, ctx: &Context) -> Result<ResourceChange> {
        if !fs::is_file_or_link(&self.dest) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        ctx.log
            .info(&format!("removing {}", self.dest.display()));
        std::fs::remove_file(&self.dest)
            .with_context(|| format!("removing {}", self.dest.display()))?;
        Ok(ResourceChange::Applied)
    }
}

/// Download `url` into `dest` (relative to home), or delete `dest` under
/// uninstall.
///
/// # Errors
///
/// Returns a [`DownloadError`] on conflicts and HTTP failures, or an I/O
/// error.
pub fn get(ctx: &Context, url: &str, dest: &Path, make_exec: bool) -> Result<ResourceChange> {
    DownloadResource::new(url, fs::absolute(&ctx.home_path(dest))?, make_exec).deploy(ctx)
}

/// Add execute permission for owner, group and other (`chmod a+x`).
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("reading permissions of {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("setting permissions of {}", path.display()))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::Options;
    use crate::context::test_helpers::{make_context, overwrite, uninstall};

    const URL: &str = "https://example.com/tool.sh";

    fn fetcher_returning(body: &'static str) -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == URL)
            .times(1)
            .returning(move |_| Ok(body.as_bytes().to_vec()));
        fetcher
    }

    fn never_fetched() -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(0);
        fetcher
    }

    fn run(home: &Path, opts: Options, fetcher: MockFetcher, exec: bool) -> Result<ResourceChange> {
        let (ctx, _) = make_context(home, home, opts);
        let ctx = ctx.with_fetcher(Arc::new(fetcher));
        get(&ctx, URL, Path::new("bin/tool.sh"), exec)
    }

    #[test]
    fn downloads_into_new_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let change = run(tmp.path(), Options::default(), fetcher_returning("echo hi"), false).unwrap();
        assert_eq!(change, ResourceChange::Applied);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("bin/tool.sh")).unwrap(),
            "echo hi"
        );
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_for_everyone() {
        use std::os::unix::fs::PermissionsExt as _;
        let tmp = tempfile::tempdir().unwrap();
        run(tmp.path(), Options::default(), fetcher_returning("#!/bin/sh"), true).unwrap();
        let mode = std::fs::metadata(tmp.path().join("bin/tool.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn existing_file_without_overwrite_fails() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("bin")).unwrap();
        std::fs::write(tmp.path().join("bin/tool.sh"), "old").unwrap();
        let err = run(tmp.path(), Options::default(), never_fetched(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DownloadError>(),
            Some(DownloadError::AlreadyExists { .. })
        ));
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("bin/tool.sh")).unwrap(),
            "old"
        );
    }

    #[test]
    fn existing_file_with_overwrite_is_replaced() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("bin")).unwrap();
        std::fs::write(tmp.path().join("bin/tool.sh"), "old").unwrap();
        run(tmp.path(), overwrite(), fetcher_returning("new"), false).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("bin/tool.sh")).unwrap(),
            "new"
        );
    }

    #[test]
    fn directory_destination_fails() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("bin/tool.sh")).unwrap();
        let err = run(tmp.path(), overwrite(), never_fetched(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DownloadError>(),
            Some(DownloadError::IsDirectory { .. })
        ));
    }

    #[test]
    fn uninstall_removes_without_fetching() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("bin")).unwrap();
        std::fs::write(tmp.path().join("bin/tool.sh"), "old").unwrap();
        let change = run(tmp.path(), uninstall(), never_fetched(), false).unwrap();
        assert_eq!(change, ResourceChange::Applied);
        assert!(!tmp.path().join("bin/tool.sh").exists());

        let change = run(tmp.path(), uninstall(), never_fetched(), false).unwrap();
        assert_eq!(change, ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn fetch_failure_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            Err(DownloadError::Http {
                url: url.to_string(),
                reason: "status code 404".to_string(),
            }
            .into())
        });
        let err = run(tmp.path(), Options::default(), fetcher, false).unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(!tmp.path().join("bin/tool.sh").exists());
    }
}
