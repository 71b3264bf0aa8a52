//! Bootstrap a Bazel workspace inside an existing Cargo project.
//!
//! `bazelize` writes the handful of files Bazel needs to drive a Cargo
//! project through gazelle_rust (`WORKSPACE`, `BUILD.bazel`, a crate_universe
//! lockfile placeholder, `.gitignore` rules, `.bazelversion`), then optionally
//! hands off to `bazel` to fetch dependencies, generate targets, and run the
//! test suite. The architecture enforces a strict separation:
//!
//! - **[`config`]**: Pure, resolved invocation options. No I/O.
//! - **[`io`]**: Side-effecting operations (filesystem scaffolding, manifest
//!   discovery, process execution). Isolated to enable mocking in tests.
//!
//! [`bootstrap`] coordinates the two to implement the CLI.

pub mod bootstrap;
pub mod config;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
