//! External command execution behind an injectable [`Executor`].
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::CommandError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` if terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
///
/// Production code uses [`SystemExecutor`]; unit tests substitute a scripted
/// mock so resource logic can be exercised without the real tools.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` and fail if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run `program` in `dir` and fail if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run `program` in `dir`, returning the result even on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run `program`, returning the result even on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Locate `program` on `PATH`, returning its absolute path.
    fn which(&self, program: &str) -> Option<PathBuf>;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn spawn(mut cmd: Command, label: &str) -> Result<ExecResult> {
        let output = cmd
            .output()
            .with_context(|| format!("failed to execute: {label}"))?;
        Ok(ExecResult::from(output))
    }

    fn checked(cmd: Command, program: &str, label: &str) -> Result<ExecResult> {
        let result = Self::spawn(cmd, label)?;
        if !result.success {
            return Err(CommandError::ExternalCommand {
                program: program.to_string(),
                code: result.code.unwrap_or(-1),
                stderr: result.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(result)
    }
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        Self::checked(cmd, program, program)
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        Self::checked(cmd, program, &format!("{program} in {}", dir.display()))
    }

    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        Self::spawn(cmd, &format!("{program} in {}", dir.display()))
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        Self::spawn(cmd, program)
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
