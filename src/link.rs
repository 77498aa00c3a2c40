//! Link planning
//!
//! Two duties before the extension link step runs. First, invalidation:
//! previously linked extension binaries embedded the old archive content, and
//! a static relink against a byte-identical-sized but different archive is
//! not reliably detected by mtime-based rebuild logic, so any binary
//! matching the invalidation glob is deleted outright, forcing the next link
//! from scratch. Second, discovery: the staged directory is scanned for the
//! static archives the native build produced, which become the extension
//! linker's link-object set. The archive list is recomputed from the
//! filesystem on every invocation, never cached.

use crate::error::BuildError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The plan handed to the extension linker
#[derive(Debug, Clone)]
pub struct LinkPlan {
    /// Absolute paths of discovered static archives, path-sorted
    pub archives: Vec<PathBuf>,
    /// How many stale extension binaries were deleted
    pub stale_removed: usize,
}

/// Delete previously linked extension binaries matching `pattern`.
///
/// Returns the number of files removed; zero matches is a normal state
/// (fresh checkout, or already invalidated).
///
/// # Errors
///
/// - [`BuildError::StalePattern`] if the glob pattern does not parse
/// - [`BuildError::Staging`] if a matched binary cannot be removed
pub fn invalidate_stale(pattern: &str) -> Result<usize, BuildError> {
    let matches = glob::glob(pattern).map_err(|e| BuildError::StalePattern {
        pattern: pattern.to_string(),
        source: e,
    })?;

    let mut removed = 0;

    for entry in matches {
        let Ok(path) = entry else { continue };
        if !path.is_file() {
            continue;
        }

        fs::remove_file(&path).map_err(|e| BuildError::Staging {
            path: path.clone(),
            source: e,
        })?;
        crate::debug!("removed stale extension binary {}", path.display());
        removed += 1;
    }

    Ok(removed)
}

/// Discover static archives under `staged_dir`.
///
/// Recursive scan for `*.a` files, returned as absolute paths in sorted
/// order so the link-object list is deterministic. May legitimately return
/// an empty list; [`plan`] turns that into a fatal error for bundled builds.
pub fn discover_archives(staged_dir: &Path) -> Vec<PathBuf> {
    let mut archives: Vec<PathBuf> = WalkDir::new(staged_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == "a"))
        .map(|p| std::path::absolute(&p).unwrap_or(p))
        .collect();

    archives.sort();
    archives
}

/// Build the full link plan for a bundled build.
///
/// # Errors
///
/// Returns [`BuildError::NoArchives`] when the native build produced no
/// archives, a silent build failure that must not reach the linker.
pub fn plan(
    staged_dir: &Path,
    stale_pattern: &str,
    library: &str,
    version: &str,
) -> Result<LinkPlan, BuildError> {
    let stale_removed = invalidate_stale(stale_pattern)?;
    let archives = discover_archives(staged_dir);

    if archives.is_empty() {
        return Err(BuildError::NoArchives {
            library: library.to_string(),
            version: version.to_string(),
            dir: staged_dir.to_path_buf(),
        });
    }

    Ok(LinkPlan {
        archives,
        stale_removed,
    })
}
