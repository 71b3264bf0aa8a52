//! Blocking subprocess execution for the bazel hand-off steps.
//!
//! The bootstrap invokes bazel sequentially with inherited stdio and no
//! timeout: the child streams its own output and runs to natural completion.
//! Execution goes through the [`CommandRunner`] trait so tests can script
//! invocations without a bazel install.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

/// A single blocking external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub workdir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables for the child (inherits the rest).
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(workdir: impl Into<PathBuf>, program: &str, args: &[&str]) -> Self {
        Self {
            workdir: workdir.into(),
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Rendered command line as reported to the user, env overrides first
    /// (e.g. `CARGO_BAZEL_REPIN=workspace bazel fetch //...`).
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// An external command exited unsuccessfully.
///
/// Carries the rendered command line and exit code so the failure can be
/// reported verbatim before the process terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailed {
    pub command: String,
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "command failed with exit code {code}: {}", self.command),
            None => write!(f, "command terminated by signal: {}", self.command),
        }
    }
}

impl std::error::Error for CommandFailed {}

/// Executes an [`Invocation`] to completion.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Real runner: spawns the child with inherited stdio and blocks until exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    #[instrument(skip_all, fields(command = %invocation.command_line()))]
    fn run(&self, invocation: &Invocation) -> Result<()> {
        println!("Running: {}", invocation.command_line());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.workdir)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        debug!("spawning child process");
        let status = cmd
            .status()
            .with_context(|| format!("spawn {}", invocation.command_line()))?;
        if !status.success() {
            return Err(CommandFailed {
                command: invocation.command_line(),
                code: status.code(),
            }
            .into());
        }
        debug!("child exited successfully");
        println!();
        Ok(())
    }
}
