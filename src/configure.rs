//! Vendored configure invocation
//!
//! Runs the vendored library's own configure script inside the staged build
//! directory, handing it the resolved toolchain as `VAR=value` arguments.
//! Invocation is gated on the generated build description: once a Makefile
//! exists in the staged directory, configure is never run again until the
//! build directory is deleted externally (`lith clean`).

use crate::error::BuildError;
use crate::toolchain::Toolchain;
use std::path::{Path, PathBuf};
use std::process::Command;

/// File configure is expected to generate; its presence gates re-runs.
pub const BUILD_DESCRIPTION: &str = "Makefile";

/// Outcome of a configure invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// The configure script ran and produced the build description
    Configured,
    /// The build description already existed; nothing was spawned
    SkippedExisting,
}

/// Path of the generated build description inside the staged directory.
#[must_use]
pub fn artifact_path(staged_dir: &Path) -> PathBuf {
    staged_dir.join(BUILD_DESCRIPTION)
}

/// Run `sh ./configure` in `staged_dir`, unless already configured.
///
/// The toolchain is embedded as `CC=`, `CFLAGS=`, `ARCHIVE=`, and `RANLIB=`
/// assignments. Each assignment is a single argv element, so values with
/// flags (`ar rcs`) reach configure intact without shell quoting. The working
/// directory is set on the child process only; this process never changes
/// directory.
///
/// # Errors
///
/// - [`BuildError::Spawn`] if the script cannot be started at all
/// - [`BuildError::Configure`] on a nonzero exit, carrying the captured output
/// - [`BuildError::ConfigureArtifactMissing`] if configure reports success
///   but the build description is absent (tooling inconsistency)
pub fn run(
    staged_dir: &Path,
    toolchain: &Toolchain,
    configure_args: &[String],
    library: &str,
    version: &str,
    verbose: bool,
) -> Result<ConfigureOutcome, BuildError> {
    let artifact = artifact_path(staged_dir);

    if artifact.exists() {
        crate::debug!("{} already configured, skipping", staged_dir.display());
        return Ok(ConfigureOutcome::SkippedExisting);
    }

    let mut cmd = Command::new("sh");
    cmd.arg("./configure")
        .args(configure_args)
        .arg(format!("CC={}", toolchain.compiler.program))
        .arg(format!("CFLAGS={}", toolchain.compiler.args.join(" ")))
        .current_dir(staged_dir);

    if let Some(archiver) = &toolchain.archiver {
        cmd.arg(format!("ARCHIVE={}", archiver.command_line()));
    }
    if let Some(ranlib) = &toolchain.ranlib {
        cmd.arg(format!("RANLIB={}", ranlib.command_line()));
    }

    crate::debug!("running configure in {}", staged_dir.display());

    let output = cmd.output().map_err(|e| BuildError::Spawn {
        tool: "sh ./configure".to_string(),
        source: e,
    })?;

    if verbose {
        print!("{}", String::from_utf8_lossy(&output.stdout));
    }

    if !output.status.success() {
        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        return Err(BuildError::Configure {
            library: library.to_string(),
            version: version.to_string(),
            status: output.status,
            output: captured,
        });
    }

    if !artifact.exists() {
        return Err(BuildError::ConfigureArtifactMissing {
            library: library.to_string(),
            version: version.to_string(),
            artifact,
        });
    }

    Ok(ConfigureOutcome::Configured)
}
