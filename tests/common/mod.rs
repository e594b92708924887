// Shared helpers for integration tests.
//
// Provides a temporary source tree and home directory plus a recording log so
// each integration test can deploy into an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotfiles_deploy::context::{Context, Options};
use dotfiles_deploy::logging::{Log, TaskEntry, TaskStatus};
use dotfiles_deploy::prompt::AlwaysDeny;

/// [`Log`] that keeps every message and task result in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<String>>,
    tasks: Mutex<Vec<TaskEntry>>,
}

impl RecordingLog {
    /// Every message as `"<level> <msg>"`.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock messages").clone()
    }

    /// Every recorded task result.
    pub fn tasks(&self) -> Vec<TaskEntry> {
        self.tasks.lock().expect("lock tasks").clone()
    }

    /// Status recorded for the task called `name`.
    pub fn status_of(&self, name: &str) -> Option<TaskStatus> {
        self.tasks()
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.status)
    }

    fn push(&self, level: &str, msg: &str) {
        self.messages
            .lock()
            .expect("lock messages")
            .push(format!("{level} {msg}"));
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks.lock().expect("lock tasks").push(TaskEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// A dotfiles source tree and an empty home, both inside one temp dir.
///
/// The directory is automatically deleted when dropped (via the underlying
/// [`tempfile::TempDir`]).
pub struct DeployFixture {
    _tmp: tempfile::TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
}

impl DeployFixture {
    /// Create the source tree:
    ///
    /// - `HOME/.bashrc`
    /// - `HOME/bin/ack` (executable)
    /// - `HOME/.grace/gracerc.user`
    /// - `HOME/.grace/templates/Default.agr`
    /// - `HOME/.config/Terminal/terminalrc`
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).expect("create home");

        let src = root.join("HOME");
        write_file(&src.join(".bashrc"), "export EDITOR=vim\n");
        write_file(&src.join("bin/ack"), "#!/bin/sh\n");
        write_file(&src.join(".grace/gracerc.user"), "grace\n");
        write_file(&src.join(".grace/templates/Default.agr"), "agr\n");
        write_file(&src.join(".config/Terminal/terminalrc"), "terminal\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            std::fs::set_permissions(
                src.join("bin/ack"),
                std::fs::Permissions::from_mode(0o755),
            )
            .expect("chmod ack");
        }

        Self {
            _tmp: tmp,
            root,
            home,
        }
    }

    /// Source files under `HOME/`, relative to it.
    pub const FILES: [&'static str; 5] = [
        ".bashrc",
        "bin/ack",
        ".grace/gracerc.user",
        ".grace/templates/Default.agr",
        ".config/Terminal/terminalrc",
    ];

    /// Build a context over this fixture with a deny-all confirmation policy.
    pub fn context(&self, opts: Options) -> (Context, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let ctx = Context::new(self.root.clone(), self.home.clone(), opts, log.clone())
            .with_config_home(self.home.join(".config"))
            .with_confirm(Arc::new(AlwaysDeny));
        (ctx, log)
    }

    /// Path of the manifest written for the `HOME` folder.
    pub fn manifest(&self) -> PathBuf {
        self.root.join(".HOME.links")
    }

    /// Every path below `home`, relative to it, sorted.
    pub fn home_entries(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        collect(&self.home, &self.home, &mut out);
        out.sort();
        out
    }
}

fn collect(base: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        out.push(path.strip_prefix(base).expect("under base").to_path_buf());
        let is_real_dir = std::fs::symlink_metadata(&path).is_ok_and(|m| m.is_dir());
        if is_real_dir {
            collect(base, &path, out);
        }
    }
}

/// Options with only the given flags set.
pub const fn options(quiet: bool, overwrite: bool, uninstall: bool) -> Options {
    Options {
        quiet,
        overwrite,
        uninstall,
    }
}
