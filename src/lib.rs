//! Dotfiles deployment engine.
//!
//! Mirrors source folders of a dotfiles tree into `$HOME` as relative
//! symlinks, tracks every created link in a per-folder manifest so links
//! whose source was deleted are pruned on the next run, and deploys
//! auxiliary git checkouts, downloaded helpers, file-type handlers, and the
//! user crontab. Everything is driven by an optional `deploy.toml` plan at
//! the root of the tree.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate the deployment plan
//! - **[`resources`]**: idempotent `check + apply` primitives (links, checkouts, downloads)
//! - **[`tasks`]**: named, ordered units of work wired to resources
//! - **[`commands`]**: top-level orchestration of a deploy or uninstall run
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod logging;
pub mod prompt;
pub mod resources;
pub mod tasks;
