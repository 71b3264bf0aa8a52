//! Resolved options for a single bootstrap run.

use std::path::PathBuf;

/// Default gazelle_rust commit to fetch when no override is given.
pub const DEFAULT_GAZELLE_RUST_COMMIT: &str = "04e5450054ba5c89013022ad14c50b68c05214fd";
/// sha256 of the gazelle_rust archive at [`DEFAULT_GAZELLE_RUST_COMMIT`].
pub const DEFAULT_GAZELLE_RUST_SHA256: &str =
    "41b9261187aeb6a6e0d097ebbcd5e10cf89c439d950b9398d5bdc10abf614ab5";

/// Default rules_rust release.
pub const DEFAULT_RULES_RUST_VERSION: &str = "0.40.0";
/// sha256 of the rules_rust release tarball at [`DEFAULT_RULES_RUST_VERSION`].
pub const DEFAULT_RULES_RUST_SHA256: &str =
    "c30dfdf1e86fd50650a76ea645b3a45f2f00667b06187a685e9554e167ca97ee";

/// Rust toolchain version registered in the generated WORKSPACE.
pub const DEFAULT_RUST_VERSION: &str = "1.73.0";

/// Bazel version written to `.bazelversion`.
pub const BAZEL_VERSION: &str = "6.4.0";

/// Where the generated WORKSPACE should load gazelle_rust from.
///
/// The two variants are mutually exclusive generation branches: a local
/// checkout produces a `local_repository` rule, everything else an
/// `http_archive` pinned by commit and checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GazelleRustSource {
    /// `local_repository` pointing at an absolute path.
    Local(PathBuf),
    /// `http_archive` of `github.com/Calsign/gazelle_rust` at a commit.
    Remote { commit: String, sha256: String },
}

/// Immutable configuration for one `bazelize` invocation.
///
/// Built once from CLI arguments, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Root of the Cargo project to bootstrap.
    pub repo_root: PathBuf,
    pub gazelle_rust: GazelleRustSource,
    pub rules_rust_version: String,
    pub rules_rust_sha256: String,
    /// Rust toolchain version for `rust_register_toolchains`.
    pub rust_version: String,
    /// Skip crate_universe integration (lockfile, crates_repository, gazelle
    /// directives) entirely.
    pub skip_crate_universe: bool,
    /// Write files only; do not invoke bazel.
    pub skip_initialize: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            gazelle_rust: GazelleRustSource::Remote {
                commit: DEFAULT_GAZELLE_RUST_COMMIT.to_string(),
                sha256: DEFAULT_GAZELLE_RUST_SHA256.to_string(),
            },
            rules_rust_version: DEFAULT_RULES_RUST_VERSION.to_string(),
            rules_rust_sha256: DEFAULT_RULES_RUST_SHA256.to_string(),
            rust_version: DEFAULT_RUST_VERSION.to_string(),
            skip_crate_universe: false,
            skip_initialize: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_is_pinned_remote() {
        let config = BootstrapConfig::default();
        match config.gazelle_rust {
            GazelleRustSource::Remote { commit, sha256 } => {
                assert_eq!(commit, DEFAULT_GAZELLE_RUST_COMMIT);
                assert_eq!(sha256, DEFAULT_GAZELLE_RUST_SHA256);
            }
            GazelleRustSource::Local(path) => panic!("unexpected local source: {path:?}"),
        }
    }
}
