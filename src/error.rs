//! Domain-specific error types for the deployment engine.
//!
//! Resource code returns these typed errors; tasks and the deploy command
//! convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DeployError
//! ├── Link(LinkError)          symlink conflicts, unexpected file kinds
//! ├── Repo(RepoError)          checkout state refusals
//! ├── Download(DownloadError)  destination conflicts, HTTP failures
//! ├── Command(CommandError)    external programs exiting non-zero
//! └── Config(ConfigError)      plan file I/O and parsing
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the deployment engine.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Link engine error.
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// Repository deployer error.
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Downloader error.
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// External command error.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the link engine.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The destination exists as a file or a link to something else.
    #[error("{} already exists", path.display())]
    Conflict {
        /// Conflicting destination path.
        path: PathBuf,
    },

    /// The destination is a directory that cannot be replaced by the source.
    #[error("existing directory {} would be overwritten by {}", path.display(), source_path.display())]
    DirectoryConflict {
        /// Destination directory.
        path: PathBuf,
        /// Source that was to be linked.
        source_path: PathBuf,
    },

    /// A directory is required but a file with the same name exists.
    #[error("a file with the same name as the desired directory {} already exists", path.display())]
    NotADirectory {
        /// Path that should have been a directory.
        path: PathBuf,
    },

    /// A source entry is neither a regular file, a symlink, nor a directory.
    #[error("{} is neither a file nor a folder", path.display())]
    UnsupportedEntry {
        /// Offending source path.
        path: PathBuf,
    },
}

/// Errors raised by the repository deployer.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Uninstall with the `clean` policy found local modifications.
    #[error("cannot uninstall {} (not clean)", path.display())]
    DirtyCheckout {
        /// Checkout directory.
        path: PathBuf,
    },
}

/// Errors raised by the downloader.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Destination already exists and neither overwrite nor uninstall is set.
    #[error("file {} already exists", path.display())]
    AlreadyExists {
        /// Destination path.
        path: PathBuf,
    },

    /// Destination is a directory.
    #[error("{} is a folder, must be a file", path.display())]
    IsDirectory {
        /// Destination path.
        path: PathBuf,
    },

    /// The HTTP request failed.
    #[error("fetching {url} failed: {reason}")]
    Http {
        /// Requested URL.
        url: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

/// Errors raised when an external program fails.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program ran but exited with a non-zero status.
    #[error("{program} returned nonzero exit status ({code}): {stderr}")]
    ExternalCommand {
        /// Program name.
        program: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },
}

/// Errors raised while loading the deployment plan.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The plan file could not be read.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Plan file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The plan file is not valid TOML or does not match the schema.
    #[error("invalid config file {}: {message}", path.display())]
    Parse {
        /// Plan file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}
