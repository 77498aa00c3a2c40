//! Source staging
//!
//! Mirrors the read-only vendored source tree into an isolated, writable
//! build directory where configuration and compilation happen. Only files
//! whose source modification time is strictly newer than the mirrored copy
//! are overwritten, so repeat invocations with an unchanged source tree
//! perform zero copies. Mirrored files are never deleted.

use crate::error::BuildError;
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tar::Archive;
use walkdir::WalkDir;

/// Mirror `source` into `dest`, returning the number of files copied.
///
/// Intermediate directories are created before any timestamp comparison. A
/// destination file is overwritten only when the source modification time is
/// strictly greater; equal timestamps (coarse filesystem clocks) leave the
/// mirror untouched.
///
/// # Errors
///
/// Any I/O failure is fatal and reported as [`BuildError::Staging`] naming
/// the offending path.
pub fn mirror(source: &Path, dest: &Path) -> Result<usize, BuildError> {
    fs::create_dir_all(dest).map_err(|e| staging(dest, e))?;

    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            let source_err = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walk failed"));
            BuildError::Staging {
                path,
                source: source_err,
            }
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| staging(entry.path(), std::io::Error::other("path escaped staging root")))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| staging(&target, e))?;
        } else if needs_copy(entry.path(), &target)? {
            fs::copy(entry.path(), &target).map_err(|e| staging(entry.path(), e))?;
            copied += 1;
            crate::debug!("staged {}", relative.display());
        }
    }

    Ok(copied)
}

/// Whether `source` must be copied over `target`: missing target, or source
/// strictly newer.
fn needs_copy(source: &Path, target: &Path) -> Result<bool, BuildError> {
    if !target.exists() {
        return Ok(true);
    }

    let source_mtime = mtime(source)?;
    let target_mtime = mtime(target)?;

    Ok(source_mtime > target_mtime)
}

fn mtime(path: &Path) -> Result<SystemTime, BuildError> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| staging(path, e))
}

fn staging(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Staging {
        path: path.to_path_buf(),
        source,
    }
}

/// Unpack a vendored source tarball if the source directory is absent.
///
/// Projects sometimes vendor the library as `<dir>.tar.gz` next to where the
/// unpacked tree would live. When `source_dir` is missing but the sibling
/// tarball exists, it is unpacked into the parent directory; the tarball is
/// expected to contain the source directory as its top-level entry.
///
/// Returns `true` if a tarball was unpacked, `false` if the directory was
/// already present.
///
/// # Errors
///
/// Returns [`BuildError::Staging`] if neither the directory nor a usable
/// tarball exists, or if unpacking fails.
pub fn unpack_vendored_tarball(source_dir: &Path) -> Result<bool, BuildError> {
    if source_dir.is_dir() {
        return Ok(false);
    }

    let tarball = tarball_path(source_dir);
    if !tarball.is_file() {
        return Err(staging(
            source_dir,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "vendored source directory not found and no tarball alongside it",
            ),
        ));
    }

    crate::debug!("unpacking {}", tarball.display());

    let file = fs::File::open(&tarball).map_err(|e| staging(&tarball, e))?;
    let parent = source_dir.parent().unwrap_or_else(|| Path::new("."));

    Archive::new(GzDecoder::new(file))
        .unpack(parent)
        .map_err(|e| staging(&tarball, e))?;

    if source_dir.is_dir() {
        Ok(true)
    } else {
        Err(staging(
            source_dir,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "tarball did not contain the expected source directory",
            ),
        ))
    }
}

fn tarball_path(source_dir: &Path) -> PathBuf {
    let mut name = source_dir.as_os_str().to_os_string();
    name.push(".tar.gz");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_tree(root: &Path, files: &[(&str, &str)]) {
        for (name, contents) in files {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, contents).unwrap();
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn mirror_copies_fresh_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("vendor");
        let dest = temp.path().join("build");

        write_tree(&source, &[("configure", "#!/bin/sh"), ("zlib/inflate.c", "int x;")]);

        let copied = mirror(&source, &dest).unwrap();

        assert_eq!(copied, 2);
        assert!(dest.join("configure").is_file());
        assert!(dest.join("zlib/inflate.c").is_file());
    }

    #[test]
    fn mirror_is_idempotent_without_source_changes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("vendor");
        let dest = temp.path().join("build");

        write_tree(&source, &[("a.c", "a"), ("sub/b.c", "b")]);

        assert_eq!(mirror(&source, &dest).unwrap(), 2);
        assert_eq!(mirror(&source, &dest).unwrap(), 0);
    }

    #[test]
    fn mirror_overwrites_when_source_is_strictly_newer() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("vendor");
        let dest = temp.path().join("build");

        write_tree(&source, &[("a.c", "old")]);
        mirror(&source, &dest).unwrap();

        fs::write(source.join("a.c"), "new").unwrap();
        set_mtime(
            &source.join("a.c"),
            SystemTime::now() + Duration::from_secs(10),
        );

        assert_eq!(mirror(&source, &dest).unwrap(), 1);
        assert_eq!(fs::read_to_string(dest.join("a.c")).unwrap(), "new");
    }

    #[test]
    fn mirror_skips_equal_timestamps() {
        // Coarse filesystem clocks can truncate distinct times to equality;
        // equal mtimes must not trigger a copy.
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("vendor");
        let dest = temp.path().join("build");

        write_tree(&source, &[("a.c", "old")]);
        mirror(&source, &dest).unwrap();

        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        fs::write(source.join("a.c"), "changed").unwrap();
        set_mtime(&source.join("a.c"), stamp);
        set_mtime(&dest.join("a.c"), stamp);

        assert_eq!(mirror(&source, &dest).unwrap(), 0);
        assert_eq!(fs::read_to_string(dest.join("a.c")).unwrap(), "old");
    }

    #[test]
    fn mirror_never_deletes_extra_build_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("vendor");
        let dest = temp.path().join("build");

        write_tree(&source, &[("a.c", "a")]);
        mirror(&source, &dest).unwrap();

        // Build artifacts accumulate in the mirror and must survive restaging.
        fs::write(dest.join("Makefile"), "all:").unwrap();
        mirror(&source, &dest).unwrap();

        assert!(dest.join("Makefile").is_file());
    }

    #[test]
    fn mirror_reports_the_offending_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("no-such-tree");
        let dest = temp.path().join("build");

        let err = mirror(&missing, &dest).unwrap_err();

        assert!(err.to_string().contains("no-such-tree"));
    }

    #[test]
    fn unpack_is_a_no_op_when_directory_exists() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("cfitsio-4.4.0");
        fs::create_dir_all(&source).unwrap();

        assert!(!unpack_vendored_tarball(&source).unwrap());
    }

    #[test]
    fn unpack_extracts_sibling_tarball() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("cfitsio-4.4.0");

        // Build cfitsio-4.4.0.tar.gz containing the directory as its top entry.
        let payload = temp.path().join("payload/cfitsio-4.4.0");
        write_tree(&payload, &[("configure", "#!/bin/sh")]);

        let tarball = fs::File::create(temp.path().join("cfitsio-4.4.0.tar.gz")).unwrap();
        let encoder = flate2::write::GzEncoder::new(tarball, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all("cfitsio-4.4.0", &payload)
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        assert!(unpack_vendored_tarball(&source).unwrap());
        assert!(source.join("configure").is_file());
    }

    #[test]
    fn unpack_fails_without_directory_or_tarball() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("cfitsio-4.4.0");

        let err = unpack_vendored_tarball(&source).unwrap_err();

        assert!(matches!(err, BuildError::Staging { .. }));
    }
}
