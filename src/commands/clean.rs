//! Clean command
//!
//! Removes the staged build directory and linked extension output. Deleting
//! the build directory is the supported way to force a fresh configure on
//! the next build.

use anyhow::{Context, Result};
use lith::Config;
use std::fs;
use std::path::Path;

/// Remove build artifacts for the configured library and extension.
pub(crate) fn run(config_path: Option<&str>, dry_run: bool) -> Result<()> {
    let config = Config::load(config_path.map(Path::new))?;

    let targets = [config.staged_dir(), config.extension_output_dir()];
    let mut removed = 0;

    for dir in &targets {
        if !dir.exists() {
            continue;
        }

        if dry_run {
            println!("Would remove {}", dir.display());
        } else {
            fs::remove_dir_all(dir)
                .with_context(|| format!("failed to remove {}", dir.display()))?;
            println!("Removed {}", dir.display());
        }
        removed += 1;
    }

    if removed == 0 {
        println!("Nothing to clean");
    }

    Ok(())
}
