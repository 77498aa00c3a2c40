//! Build error taxonomy
//!
//! Every failure in the native build pipeline is fatal: nothing is retried
//! and there is no partial-success state. The build either completes (bundled
//! archives linked, or the system link flag applied) or aborts with an error
//! naming the failing stage and the vendored library.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while orchestrating the vendored library build
#[derive(Debug, Error)]
pub enum BuildError {
    /// I/O failure while mirroring vendored source into the build directory
    #[error("failed to stage {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The vendored configure script exited nonzero
    #[error("could not configure {library} {version} ({status})")]
    Configure {
        library: String,
        version: String,
        status: ExitStatus,
        /// Captured stdout + stderr of the configure run
        output: String,
    },

    /// Configure reported success but did not produce its build description
    #[error("configure of {library} {version} succeeded but {artifact} was not produced")]
    ConfigureArtifactMissing {
        library: String,
        version: String,
        artifact: PathBuf,
    },

    /// The generated build description could not be read back
    #[error("could not read build description {path}: {source}")]
    FeatureProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The vendored build tool exited nonzero
    #[error("could not compile {library} {version} ({status})")]
    Compile {
        library: String,
        version: String,
        status: ExitStatus,
    },

    /// The native build reported success but produced no static archives
    #[error("no static archives found under {dir} after building {library} {version}")]
    NoArchives {
        library: String,
        version: String,
        dir: PathBuf,
    },

    /// No C compiler invocation could be resolved from the host environment
    #[error("no C compiler found; set CC or add a [toolchain] table to lith.toml")]
    CompilerNotFound,

    /// A build tool could not be spawned at all (missing binary, permissions)
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The stale-binary invalidation pattern did not parse
    #[error("invalid stale-binary pattern {pattern}: {source}")]
    StalePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The extension compiler/linker collaborator failed
    #[error("extension build failed: {reason}")]
    Extension { reason: String },
}
