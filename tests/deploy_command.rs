#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for a full deployment run: the planned task list, a
//! deploy/uninstall cycle, and the abort on critical failures.

mod common;

use std::path::Path;

use common::*;
use dotfiles_deploy::commands::deploy::deploy;
use dotfiles_deploy::config::Config;
use dotfiles_deploy::logging::TaskStatus;
use dotfiles_deploy::tasks;

const FULL_PLAN: &str = r#"
[[links]]
folder = "HOME"

[editor]
layout = "neovim"
neovim = "https://github.com/user/nvim.git"

[[repos]]
url = "git@github.com:user/mutt.git"
dest = ".mutt"

[[downloads]]
url = "https://example.com/git-prompt.sh"
dest = "bin/git-prompt.sh"

[handlers]
file = "handlers.duti"

[crontab]
file = "~/.crontab"
"#;

fn parse(text: &str) -> Config {
    Config::parse(text, Path::new("deploy.toml")).unwrap()
}

// ---------------------------------------------------------------------------
// Snapshot: planned task list
// ---------------------------------------------------------------------------

/// Task names of a plan that uses every section, in execution order.
#[test]
fn full_plan_task_names() {
    let planned = tasks::plan(&parse(FULL_PLAN)).unwrap();
    let names: Vec<&str> = planned.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!(names.join("\n"), @r"
    Update dotfiles
    Link HOME
    Deploy neovim config
    Deploy .mutt
    Download bin/git-prompt.sh
    Register file handlers
    Set crontab
    ");
}

#[test]
fn only_links_and_downloads_are_critical() {
    let planned = tasks::plan(&parse(FULL_PLAN)).unwrap();
    let critical: Vec<&str> = planned
        .iter()
        .filter(|t| t.is_critical())
        .map(|t| t.name())
        .collect();
    assert_eq!(critical, vec!["Link HOME", "Download bin/git-prompt.sh"]);
}

#[test]
fn invalid_ignore_pattern_is_rejected() {
    let config = parse("ignore = [\"[\"]\n");
    assert!(tasks::plan(&config).is_err());
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

#[test]
fn default_plan_links_home() {
    let fx = DeployFixture::new();
    let (ctx, log) = fx.context(options(true, false, false));

    let failures = deploy(&ctx, &Config::default()).unwrap();
    assert_eq!(failures, 0, "{:?}", log.messages());
    assert_eq!(
        log.status_of("Update dotfiles"),
        Some(TaskStatus::NotApplicable)
    );
    assert_eq!(log.status_of("Link HOME"), Some(TaskStatus::Ok));
    for file in DeployFixture::FILES {
        assert!(
            std::fs::symlink_metadata(fx.home.join(file))
                .unwrap()
                .file_type()
                .is_symlink(),
            "{file} is not a link"
        );
    }
}

#[test]
fn deploy_then_uninstall_restores_home() {
    let fx = DeployFixture::new();
    write_file(&fx.home.join(".profile"), "mine\n");
    let before = fx.home_entries();

    let (ctx, _) = fx.context(options(true, false, false));
    assert_eq!(deploy(&ctx, &Config::default()).unwrap(), 0);
    assert_ne!(fx.home_entries(), before);

    let (ctx, log) = fx.context(options(true, false, true));
    assert_eq!(deploy(&ctx, &Config::default()).unwrap(), 0);
    assert_eq!(fx.home_entries(), before, "{:?}", log.messages());
}

#[test]
fn critical_failure_aborts_remaining_tasks() {
    let fx = DeployFixture::new();
    write_file(&fx.home.join(".bashrc"), "local\n");
    let config = parse(
        r#"
[[downloads]]
url = "https://example.com/git-prompt.sh"
dest = "bin/git-prompt.sh"

[crontab]
file = "~/.crontab"
"#,
    );

    let (ctx, log) = fx.context(options(true, false, false));
    let failures = deploy(&ctx, &config).unwrap();
    assert_eq!(failures, 1);
    assert_eq!(log.status_of("Link HOME"), Some(TaskStatus::Failed));
    assert_eq!(
        log.status_of("Download bin/git-prompt.sh"),
        Some(TaskStatus::Aborted)
    );
    assert_eq!(log.status_of("Set crontab"), Some(TaskStatus::Aborted));
    assert!(!fx.home.join("bin/git-prompt.sh").exists());
    assert!(fx.manifest().exists(), "manifest is written after a failed walk");
}

#[test]
fn overwrite_replaces_conflicts() {
    let fx = DeployFixture::new();
    write_file(&fx.home.join(".bashrc"), "local\n");

    let (ctx, _) = fx.context(options(true, true, false));
    assert_eq!(deploy(&ctx, &Config::default()).unwrap(), 0);
    assert!(
        std::fs::symlink_metadata(fx.home.join(".bashrc"))
            .unwrap()
            .file_type()
            .is_symlink()
    );
}
