//! Native build invocation
//!
//! Invokes the vendored build tool (plain `make` by default, `MAKE` or the
//! `[toolchain]` table can substitute another) inside the staged build
//! directory. The tool gets no arguments beyond its defaults; whatever
//! parallelism it applies internally is opaque to this layer. The working
//! directory is set on the child process, never on this process.

use crate::error::BuildError;
use crate::toolchain::ToolInvocation;
use std::path::Path;
use std::process::Command;

/// Run the native build tool in `staged_dir`.
///
/// Archive existence is verified by the link planner afterwards, not here.
///
/// # Errors
///
/// - [`BuildError::Spawn`] if the build tool cannot be started
/// - [`BuildError::Compile`] on a nonzero exit; captured output is echoed to
///   stderr first so the compiler diagnostics are not lost
pub fn run_native_build(
    staged_dir: &Path,
    make: &ToolInvocation,
    library: &str,
    version: &str,
    verbose: bool,
) -> Result<(), BuildError> {
    crate::debug!("running {} in {}", make.command_line(), staged_dir.display());

    let output = Command::new(&make.program)
        .args(&make.args)
        .current_dir(staged_dir)
        .output()
        .map_err(|e| BuildError::Spawn {
            tool: make.command_line(),
            source: e,
        })?;

    if verbose {
        print!("{}", String::from_utf8_lossy(&output.stdout));
    }

    if !output.status.success() {
        eprint!("{}", String::from_utf8_lossy(&output.stdout));
        eprint!("{}", String::from_utf8_lossy(&output.stderr));

        return Err(BuildError::Compile {
            library: library.to_string(),
            version: version.to_string(),
            status: output.status,
        });
    }

    Ok(())
}
