//! Test-only fixtures: fake Cargo projects and a scripted command runner.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::io::process::{CommandFailed, CommandRunner, Invocation};

/// Temporary Cargo project with a root manifest, for scaffolding tests.
pub struct CargoFixture {
    temp: TempDir,
}

impl CargoFixture {
    /// Create a tempdir holding a minimal root `Cargo.toml`.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let fixture = Self { temp };
        write_manifest(&fixture.temp.path().join("Cargo.toml"), "fixture")?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Add a member package at `rel` (slash-separated) with its own manifest.
    pub fn add_manifest(&self, rel: &str) -> Result<()> {
        let dir = self.root().join(rel);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let name = rel.rsplit('/').next().unwrap_or(rel);
        write_manifest(&dir.join("Cargo.toml"), name)
    }
}

fn write_manifest(path: &Path, name: &str) -> Result<()> {
    let contents = format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\n");
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

/// [`CommandRunner`] that records invocations instead of spawning processes,
/// optionally failing at a scripted call index.
pub struct ScriptedRunner {
    calls: RefCell<Vec<Invocation>>,
    fail_at: Option<(usize, i32)>,
}

impl ScriptedRunner {
    /// Runner where every invocation succeeds.
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_at: None,
        }
    }

    /// Runner whose `index`-th invocation (0-based) fails with `code`.
    pub fn failing_at(index: usize, code: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_at: Some((index, code)),
        }
    }

    /// Invocations recorded so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let index = self.calls.borrow().len();
        self.calls.borrow_mut().push(invocation.clone());
        if let Some((fail_index, code)) = self.fail_at
            && fail_index == index
        {
            return Err(CommandFailed {
                command: invocation.command_line(),
                code: Some(code),
            }
            .into());
        }
        Ok(())
    }
}
