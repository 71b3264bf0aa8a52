//! Materialization of the generated Bazel configuration files.
//!
//! Every file is written exactly once: if it already exists the step logs a
//! notice and leaves it alone, so re-running the tool never clobbers user
//! edits. The one exception is `.gitignore`, which is always appended to.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{BAZEL_VERSION, BootstrapConfig, GazelleRustSource};
use crate::io::manifests::discover_manifests;

/// Canonical paths of the generated files for a project root.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub workspace: PathBuf,
    pub build: PathBuf,
    pub lockfile: PathBuf,
    pub gitignore: PathBuf,
    pub bazelversion: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            workspace: root.join("WORKSPACE"),
            build: root.join("BUILD.bazel"),
            lockfile: root.join("cargo-bazel-lock.json"),
            gitignore: root.join(".gitignore"),
            bazelversion: root.join(".bazelversion"),
            root,
        }
    }
}

/// Write `WORKSPACE`, discovering manifests for the crate_universe section
/// unless that integration is skipped.
///
/// Returns whether the file was written. The contents are rendered fully in
/// memory before anything touches disk, so a discovery failure leaves no
/// partial WORKSPACE behind.
pub fn ensure_workspace(paths: &WorkspacePaths, config: &BootstrapConfig) -> Result<bool> {
    if paths.workspace.exists() {
        println!("WORKSPACE already exists, skipping setup");
        return Ok(false);
    }

    let manifests = if config.skip_crate_universe {
        Vec::new()
    } else {
        discover_manifests(&paths.root)?
    };

    println!("Writing WORKSPACE...");
    let contents = render_workspace(config, &manifests);
    write_file(&paths.workspace, &contents)?;
    Ok(true)
}

/// Write the root `BUILD.bazel` declaring the gazelle target. Skip-if-exists.
pub fn ensure_build(paths: &WorkspacePaths, config: &BootstrapConfig) -> Result<bool> {
    if paths.build.exists() {
        println!("BUILD.bazel already exists, skipping setup");
        return Ok(false);
    }

    println!("Writing BUILD.bazel...");
    write_file(&paths.build, &render_build(config))?;
    Ok(true)
}

/// Create an empty `cargo-bazel-lock.json` unless crate_universe integration
/// is skipped; the fetch step populates it later. Skip-if-exists.
pub fn ensure_lockfile(paths: &WorkspacePaths, config: &BootstrapConfig) -> Result<bool> {
    if config.skip_crate_universe {
        return Ok(false);
    }
    if paths.lockfile.exists() {
        println!("cargo-bazel-lock.json already exists, skipping setup");
        return Ok(false);
    }

    // Just touch the file, it gets pinned during the fetch step.
    write_file(&paths.lockfile, "")?;
    Ok(true)
}

const GITIGNORE_BLOCK: &str = "\n# bazel output symlinks\n/bazel-*\n";

/// Append the bazel output-symlink pattern to `.gitignore`, creating the file
/// if absent.
///
/// Deliberately not existence-gated: repeat runs append a duplicate block.
pub fn append_gitignore(paths: &WorkspacePaths) -> Result<()> {
    println!("Appending to .gitignore...");

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.gitignore)
        .with_context(|| format!("open {}", paths.gitignore.display()))?;
    file.write_all(GITIGNORE_BLOCK.as_bytes())
        .with_context(|| format!("append {}", paths.gitignore.display()))?;
    Ok(())
}

/// Write the pinned bazel version to `.bazelversion`. Skip-if-exists.
pub fn ensure_bazelversion(paths: &WorkspacePaths) -> Result<bool> {
    if paths.bazelversion.exists() {
        println!(".bazelversion already exists, skipping setup");
        return Ok(false);
    }

    println!("Writing .bazelversion");
    write_file(&paths.bazelversion, &format!("{BAZEL_VERSION}\n"))?;
    Ok(true)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = contents.len(), "writing file");
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

/// Render the full WORKSPACE contents for the configured sources.
pub fn render_workspace(config: &BootstrapConfig, manifests: &[String]) -> String {
    let mut out = String::new();
    out.push_str("load(\"@bazel_tools//tools/build_defs/repo:http.bzl\", \"http_archive\")\n");

    match &config.gazelle_rust {
        GazelleRustSource::Local(path) => {
            out.push_str(&format!(
                r#"
# Load gazelle_rust from a local directory (bazelize was run with
# --local-gazelle-rust).
local_repository(
    name = "gazelle_rust",
    path = "{path}",
)
"#,
                path = path.display()
            ));
        }
        GazelleRustSource::Remote { commit, sha256 } => {
            out.push_str(&format!(
                r#"
http_archive(
    name = "gazelle_rust",
    sha256 = "{sha256}",
    strip_prefix = "gazelle_rust-{commit}",
    urls = ["https://github.com/Calsign/gazelle_rust/archive/{commit}.zip"],
)
"#
            ));
        }
    }

    out.push_str(&format!(
        r#"
http_archive(
    name = "rules_rust",
    sha256 = "{sha256}",
    urls = ["https://github.com/bazelbuild/rules_rust/releases/download/{version}/rules_rust-v{version}.tar.gz"],
)
"#,
        version = config.rules_rust_version,
        sha256 = config.rules_rust_sha256,
    ));

    out.push_str(&format!(
        r#"
load("@rules_rust//rust:repositories.bzl", "rules_rust_dependencies", "rust_register_toolchains")

rules_rust_dependencies()

rust_register_toolchains(
    edition = "2021",
    versions = ["{version}"],
)
"#,
        version = config.rust_version,
    ));

    if !config.skip_crate_universe {
        let manifest_lines = manifests
            .iter()
            .map(|label| format!("        \"{label}\","))
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&format!(
            r#"
load("@rules_rust//crate_universe:defs.bzl", "crates_repository")

# Use crate_universe to pull in external crates using the same lockfile that
# cargo uses.
crates_repository(
    name = "crates",
    lockfile = "//:cargo-bazel-lock.json",
    cargo_lockfile = "//:Cargo.lock",
    manifests = [
{manifest_lines}
    ],
)

load("@crates//:defs.bzl", "crate_repositories")

crate_repositories()
"#
        ));
    }

    out.push_str(
        r#"
# Load dependencies for gazelle_rust.

load("@gazelle_rust//:deps1.bzl", "gazelle_rust_dependencies1")

gazelle_rust_dependencies1()

load("@gazelle_rust//:deps2.bzl", "gazelle_rust_dependencies2")

gazelle_rust_dependencies2()
"#,
    );

    out
}

/// Render the root BUILD.bazel contents.
pub fn render_build(config: &BootstrapConfig) -> String {
    let mut out = String::new();
    out.push_str("load(\"@bazel_gazelle//:def.bzl\", \"gazelle\")\n");

    if !config.skip_crate_universe {
        out.push_str(
            r#"
# Tell gazelle_rust to generate from Cargo.toml files rather than the
# default "pure-bazel" mode.
# gazelle:rust_mode generate_from_cargo

# Tell gazelle_rust where we get our external crates from.
# gazelle:rust_lockfile cargo-bazel-lock.json
# gazelle:rust_crates_prefix @crates//:
"#,
        );
    }

    out.push_str(
        r#"
# Gazelle target. Run with: bazel run //:gazelle
gazelle(
    name = "gazelle",
    gazelle = "@gazelle_rust//:gazelle_bin",
)
"#,
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CargoFixture;

    fn remote_config(root: &Path) -> BootstrapConfig {
        BootstrapConfig {
            repo_root: root.to_path_buf(),
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn workspace_pins_remote_archives_and_manifests() {
        let config = remote_config(Path::new("."));
        let manifests = vec![
            "//:Cargo.toml".to_string(),
            "//crates/alpha:Cargo.toml".to_string(),
        ];

        let rendered = render_workspace(&config, &manifests);

        assert!(rendered.contains("strip_prefix = \"gazelle_rust-04e5450054ba5c89013022ad14c50b68c05214fd\""));
        assert!(rendered.contains(
            "urls = [\"https://github.com/bazelbuild/rules_rust/releases/download/0.40.0/rules_rust-v0.40.0.tar.gz\"]"
        ));
        assert!(rendered.contains("versions = [\"1.73.0\"]"));
        assert!(rendered.contains("        \"//:Cargo.toml\",\n        \"//crates/alpha:Cargo.toml\","));
        assert!(rendered.contains("crate_repositories()"));
        assert!(rendered.contains("gazelle_rust_dependencies2()"));
        assert!(!rendered.contains("local_repository"));
    }

    #[test]
    fn workspace_local_override_replaces_remote_archive() {
        let mut config = remote_config(Path::new("."));
        config.gazelle_rust = GazelleRustSource::Local(PathBuf::from("/src/gazelle_rust"));

        let rendered = render_workspace(&config, &["//:Cargo.toml".to_string()]);

        assert!(rendered.contains("local_repository(\n    name = \"gazelle_rust\",\n    path = \"/src/gazelle_rust\",\n)"));
        assert!(!rendered.contains("github.com/Calsign/gazelle_rust/archive"));
        // rules_rust stays remote either way.
        assert!(rendered.contains("http_archive(\n    name = \"rules_rust\""));
    }

    #[test]
    fn workspace_skip_crate_universe_omits_crates_repository() {
        let mut config = remote_config(Path::new("."));
        config.skip_crate_universe = true;

        let rendered = render_workspace(&config, &[]);

        assert!(!rendered.contains("crates_repository"));
        assert!(!rendered.contains("cargo-bazel-lock.json"));
        assert!(rendered.contains("gazelle_rust_dependencies1()"));
    }

    #[test]
    fn build_directives_follow_crate_universe_flag() {
        let with_universe = render_build(&remote_config(Path::new(".")));
        assert!(with_universe.contains("# gazelle:rust_mode generate_from_cargo"));
        assert!(with_universe.contains("# gazelle:rust_lockfile cargo-bazel-lock.json"));
        assert!(with_universe.contains("# gazelle:rust_crates_prefix @crates//:"));

        let mut config = remote_config(Path::new("."));
        config.skip_crate_universe = true;
        let without = render_build(&config);
        assert!(!without.contains("gazelle:rust_mode"));
        assert!(!without.contains("gazelle:rust_lockfile"));
        assert!(without.contains("gazelle = \"@gazelle_rust//:gazelle_bin\""));
    }

    #[test]
    fn ensure_workspace_never_overwrites() {
        let fixture = CargoFixture::new().expect("fixture");
        let paths = WorkspacePaths::new(fixture.root());
        std::fs::write(&paths.workspace, "# hand-edited\n").expect("write");

        let written =
            ensure_workspace(&paths, &remote_config(fixture.root())).expect("ensure");

        assert!(!written);
        let contents = std::fs::read_to_string(&paths.workspace).expect("read");
        assert_eq!(contents, "# hand-edited\n");
    }

    #[test]
    fn ensure_workspace_fails_cleanly_without_manifests() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(temp.path());

        let err = ensure_workspace(&paths, &remote_config(temp.path())).unwrap_err();

        assert!(err.to_string().contains("no Cargo.toml found"));
        // Rendering happens before writing, so no partial file is left.
        assert!(!paths.workspace.exists());
    }

    #[test]
    fn ensure_lockfile_touches_empty_file_once() {
        let fixture = CargoFixture::new().expect("fixture");
        let paths = WorkspacePaths::new(fixture.root());
        let config = remote_config(fixture.root());

        assert!(ensure_lockfile(&paths, &config).expect("ensure"));
        assert_eq!(std::fs::read_to_string(&paths.lockfile).expect("read"), "");

        std::fs::write(&paths.lockfile, "{\"pinned\":true}").expect("write");
        assert!(!ensure_lockfile(&paths, &config).expect("re-ensure"));
        assert_eq!(
            std::fs::read_to_string(&paths.lockfile).expect("read"),
            "{\"pinned\":true}"
        );
    }

    #[test]
    fn ensure_lockfile_skipped_with_crate_universe_off() {
        let fixture = CargoFixture::new().expect("fixture");
        let paths = WorkspacePaths::new(fixture.root());
        let mut config = remote_config(fixture.root());
        config.skip_crate_universe = true;

        assert!(!ensure_lockfile(&paths, &config).expect("ensure"));
        assert!(!paths.lockfile.exists());
    }

    #[test]
    fn append_gitignore_duplicates_on_repeat_runs() {
        let fixture = CargoFixture::new().expect("fixture");
        let paths = WorkspacePaths::new(fixture.root());

        append_gitignore(&paths).expect("append");
        append_gitignore(&paths).expect("append again");

        let contents = std::fs::read_to_string(&paths.gitignore).expect("read");
        assert_eq!(contents.matches("/bazel-*").count(), 2);
    }

    #[test]
    fn append_gitignore_preserves_existing_rules() {
        let fixture = CargoFixture::new().expect("fixture");
        let paths = WorkspacePaths::new(fixture.root());
        std::fs::write(&paths.gitignore, "/target\n").expect("write");

        append_gitignore(&paths).expect("append");

        let contents = std::fs::read_to_string(&paths.gitignore).expect("read");
        assert!(contents.starts_with("/target\n"));
        assert!(contents.contains("/bazel-*"));
    }

    #[test]
    fn ensure_bazelversion_writes_pinned_version() {
        let fixture = CargoFixture::new().expect("fixture");
        let paths = WorkspacePaths::new(fixture.root());

        assert!(ensure_bazelversion(&paths).expect("ensure"));
        assert_eq!(
            std::fs::read_to_string(&paths.bazelversion).expect("read"),
            "6.4.0\n"
        );

        std::fs::write(&paths.bazelversion, "7.0.0\n").expect("write");
        assert!(!ensure_bazelversion(&paths).expect("re-ensure"));
        assert_eq!(
            std::fs::read_to_string(&paths.bazelversion).expect("read"),
            "7.0.0\n"
        );
    }
}
