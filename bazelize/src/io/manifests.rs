//! Discovery of `Cargo.toml` manifests under the project root.
//!
//! crate_universe needs the full list of workspace manifests, and gazelle
//! needs every manifest's directory to be a valid Bazel package, so discovery
//! also drops an empty `BUILD.bazel` next to any manifest that lacks one.

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const MANIFEST_FILE: &str = "Cargo.toml";
const BUILD_FILE: &str = "BUILD.bazel";

/// Directories whose subtrees never contain project manifests.
const PRUNED_DIRS: [&str; 2] = ["target", ".git"];

/// Discover every `Cargo.toml` under `root` and return its Bazel label
/// (`//<package>:Cargo.toml`, or `//:Cargo.toml` for the root manifest).
///
/// Walks the tree without following symlinks, pruning `target` and `.git`
/// subtrees, in deterministic (sorted) order. For every manifest outside the
/// root, an empty `BUILD.bazel` is created in its directory if missing, so
/// the returned labels are valid reference targets.
///
/// Errors if no manifest is found: without at least one dependency source
/// there is nothing for crate_universe to resolve.
pub fn discover_manifests(root: &Path) -> Result<Vec<String>> {
    let mut labels = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry));
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
            continue;
        }

        let package_dir = entry
            .path()
            .parent()
            .ok_or_else(|| anyhow!("manifest {} has no parent", entry.path().display()))?;
        let package = package_label(root, package_dir)?;
        debug!(package = %package, "found manifest");

        if !package.is_empty() {
            let build_file = package_dir.join(BUILD_FILE);
            if !build_file.exists() {
                debug!(path = %build_file.display(), "creating empty build file");
                fs::write(&build_file, "")
                    .with_context(|| format!("write {}", build_file.display()))?;
            }
        }

        labels.push(format!("//{package}:{MANIFEST_FILE}"));
    }

    if labels.is_empty() {
        return Err(anyhow!(
            "no {} found under {} (cannot bootstrap without at least one manifest)",
            MANIFEST_FILE,
            root.display()
        ));
    }

    Ok(labels)
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && PRUNED_DIRS
            .iter()
            .any(|pruned| entry.file_name() == *pruned)
}

/// Project-relative package path with `/` separators ("" for the root).
fn package_label(root: &Path, dir: &Path) -> Result<String> {
    let rel = dir
        .strip_prefix(root)
        .with_context(|| format!("{} is not under {}", dir.display(), root.display()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| anyhow!("non-UTF-8 path component in {}", dir.display()))?,
            ),
            Component::CurDir => {}
            other => {
                return Err(anyhow!(
                    "unexpected path component {:?} in {}",
                    other,
                    dir.display()
                ));
            }
        }
    }
    Ok(parts.join("/"))
}
