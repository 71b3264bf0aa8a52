//! CLI entry point for `bazelize`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bazelize::bootstrap::run_bootstrap;
use bazelize::config::{
    BootstrapConfig, DEFAULT_GAZELLE_RUST_COMMIT, DEFAULT_GAZELLE_RUST_SHA256,
    DEFAULT_RULES_RUST_SHA256, DEFAULT_RULES_RUST_VERSION, DEFAULT_RUST_VERSION,
    GazelleRustSource,
};
use bazelize::io::process::ProcessRunner;
use bazelize::{exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "bazelize",
    version,
    about = "Set up a bazel workspace in an existing cargo project"
)]
struct Cli {
    /// Directory containing the cargo project.
    #[arg(long, default_value = ".")]
    repo_root: PathBuf,

    /// Use a local_repository for gazelle_rust at the given path.
    #[arg(long)]
    local_gazelle_rust: Option<PathBuf>,

    /// Override the default gazelle_rust commit.
    #[arg(long, default_value = DEFAULT_GAZELLE_RUST_COMMIT)]
    gazelle_rust_commit: String,

    /// Override the default gazelle_rust sha256.
    #[arg(long, default_value = DEFAULT_GAZELLE_RUST_SHA256)]
    gazelle_rust_sha256: String,

    /// Override the default rules_rust version.
    #[arg(long, default_value = DEFAULT_RULES_RUST_VERSION)]
    rules_rust_version: String,

    /// Override the default rules_rust sha256.
    #[arg(long, default_value = DEFAULT_RULES_RUST_SHA256)]
    rules_rust_sha256: String,

    /// Override the default rust version.
    #[arg(long, default_value = DEFAULT_RUST_VERSION)]
    rust_version: String,

    /// Skip setting up crate universe.
    #[arg(long)]
    skip_crate_universe: bool,

    /// Don't run bazel, just write files.
    #[arg(long)]
    skip_initialize: bool,
}

impl Cli {
    fn into_config(self) -> Result<BootstrapConfig> {
        let gazelle_rust = match self.local_gazelle_rust {
            Some(path) => GazelleRustSource::Local(
                std::path::absolute(&path)
                    .with_context(|| format!("absolutize {}", path.display()))?,
            ),
            None => GazelleRustSource::Remote {
                commit: self.gazelle_rust_commit,
                sha256: self.gazelle_rust_sha256,
            },
        };
        Ok(BootstrapConfig {
            repo_root: self.repo_root,
            gazelle_rust,
            rules_rust_version: self.rules_rust_version,
            rules_rust_sha256: self.rules_rust_sha256,
            rust_version: self.rust_version,
            skip_crate_universe: self.skip_crate_universe,
            skip_initialize: self.skip_initialize,
        })
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.into_config()?;
    run_bootstrap(&config, &ProcessRunner)
}
