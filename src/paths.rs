//! Build-tree layout
//!
//! One place for the path conventions the pipeline shares: vendored source
//! lives under `vendor/<name>-<version>`, the staged mirror and all build
//! artifacts under `build/<name>-<version>`, and linked extension binaries
//! under `build/ext`.

use std::path::{Path, PathBuf};

/// Directory the vendored source tree is expected in by default.
#[must_use]
pub fn vendored_source_dir(name: &str, version: &str) -> PathBuf {
    Path::new("vendor").join(format!("{name}-{version}"))
}

/// Staged build directory for a library under the build root.
#[must_use]
pub fn staged_dir(build_dir: &Path, name: &str, version: &str) -> PathBuf {
    build_dir.join(format!("{name}-{version}"))
}

/// Default output directory for linked extension binaries.
#[must_use]
pub fn extension_output_dir(build_dir: &Path) -> PathBuf {
    build_dir.join("ext")
}

/// Default glob matching previously linked extension binaries.
///
/// Covers plain `.so` files and versioned names (`.so.1`) in the output
/// directory.
#[must_use]
pub fn default_stale_pattern(output_dir: &Path, extension_name: &str) -> String {
    format!("{}/{extension_name}*.so*", output_dir.display())
}
