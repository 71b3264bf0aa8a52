//! Orchestration for a full bootstrap run.
//!
//! The scaffolding steps always run, in a fixed order: WORKSPACE, root
//! BUILD.bazel, lockfile placeholder, `.gitignore` append, `.bazelversion`.
//! Unless `--skip-initialize` was given, the run then hands off to bazel:
//! fetch external repositories, run gazelle, build and test everything. The
//! first failing invocation aborts the run.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::BootstrapConfig;
use crate::io::process::{CommandRunner, Invocation};
use crate::io::scaffold::{
    WorkspacePaths, append_gitignore, ensure_bazelversion, ensure_build, ensure_lockfile,
    ensure_workspace,
};

const BAZEL: &str = "bazel";

/// Execute one bootstrap run against `config.repo_root`.
pub fn run_bootstrap<R: CommandRunner>(config: &BootstrapConfig, runner: &R) -> Result<()> {
    debug!(root = %config.repo_root.display(), "bootstrapping bazel workspace");
    let paths = WorkspacePaths::new(&config.repo_root);

    ensure_workspace(&paths, config)?;
    ensure_build(&paths, config)?;
    ensure_lockfile(&paths, config)?;
    append_gitignore(&paths)?;
    ensure_bazelversion(&paths)?;

    if config.skip_initialize {
        debug!("skipping bazel initialization");
        return Ok(());
    }

    fetch_repos(config, runner)?;
    run_gazelle(config, runner)?;
    build_and_test(config, runner)?;

    info!(root = %config.repo_root.display(), "workspace bootstrapped");
    Ok(())
}

/// `bazel fetch //...`, re-pinning the crate_universe lockfile when that
/// integration is active.
fn fetch_repos<R: CommandRunner>(config: &BootstrapConfig, runner: &R) -> Result<()> {
    let mut invocation = Invocation::new(&config.repo_root, BAZEL, &["fetch", "//..."]);
    if config.skip_crate_universe {
        println!("Fetching bazel repositories...");
    } else {
        println!("Fetching bazel repositories and pinning crate_universe lockfile...");
        invocation = invocation.with_env("CARGO_BAZEL_REPIN", "workspace");
    }
    runner.run(&invocation)
}

/// `bazel run //:gazelle` to generate build targets from the manifests.
fn run_gazelle<R: CommandRunner>(config: &BootstrapConfig, runner: &R) -> Result<()> {
    println!("Running gazelle to create bazel targets...");
    runner.run(&Invocation::new(
        &config.repo_root,
        BAZEL,
        &["run", "//:gazelle"],
    ))
}

/// `bazel test //...` over the whole workspace.
fn build_and_test<R: CommandRunner>(config: &BootstrapConfig, runner: &R) -> Result<()> {
    println!("Building all bazel targets and running all tests...");
    runner.run(&Invocation::new(
        &config.repo_root,
        BAZEL,
        &["test", "//..."],
    ))
}
