//! Stable exit codes for the bazelize CLI.

/// Scaffolding (and, unless skipped, all three bazel invocations) succeeded.
pub const OK: i32 = 0;
/// No manifests found, a bazel invocation failed, or any other error.
pub const FAILURE: i32 = 1;
