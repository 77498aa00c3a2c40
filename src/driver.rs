//! Extension build orchestration
//!
//! Sequences the whole pipeline once per build invocation: resolve the
//! toolchain, stage the vendored source, configure, probe features, run the
//! native build, plan the link, then delegate to the extension compiler. The
//! alternative system-library branch skips everything and appends a single
//! link flag. The two branches are exclusive; the mode is fixed before the
//! chain begins.
//!
//! The extension compiler/linker is a collaborator behind the
//! [`ExtensionHost`] trait rather than a base class to override, so the
//! orchestrator can be driven against a recording mock in tests and against
//! [`crate::host::CcHost`] in production.

use crate::config::Config;
use crate::configure::{self, ConfigureOutcome};
use crate::error::BuildError;
use crate::toolchain::Toolchain;
use crate::{compile, features, link, stage};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Which branch of the pipeline runs this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Build the vendored library and statically link its archives
    Bundled,
    /// Link against a system-installed copy; no staging, configure, or build
    System,
}

impl BuildMode {
    /// Fix the mode for one invocation from configuration input.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.use_system_library() {
            Self::System
        } else {
            Self::Bundled
        }
    }
}

/// The host build step this orchestrator configures
///
/// Implementations collect link inputs and finally compile and link the
/// extension module sources. The orchestrator never compiles the extension
/// itself; it only decides what the host links against.
pub trait ExtensionHost {
    /// Add a header search directory for the extension sources
    fn add_include_dir(&mut self, dir: &Path);
    /// Add a library resolved by name at link time (`-l<library>`)
    fn add_library(&mut self, library: &str);
    /// Append a raw link flag
    fn add_link_flag(&mut self, flag: &str);
    /// Set the static archives linked directly into the extension
    fn set_link_objects(&mut self, objects: Vec<PathBuf>);
    /// Compile and link the extension module
    fn build_extension(&mut self) -> Result<(), BuildError>;
}

/// What one orchestrator run did, for reporting and tests
#[derive(Debug)]
pub struct BuildReport {
    /// Branch taken
    pub mode: BuildMode,
    /// Files copied while staging (0 on an unchanged rerun)
    pub staged: usize,
    /// Configure outcome; `None` in system mode
    pub configure: Option<ConfigureOutcome>,
    /// Optional features detected from the build description
    pub features: BTreeSet<String>,
    /// Stale extension binaries deleted before the link
    pub stale_removed: usize,
    /// Static archives handed to the host as link objects
    pub archives: Vec<PathBuf>,
}

/// Sequences the build pipeline against an [`ExtensionHost`]
#[derive(Debug)]
pub struct Orchestrator<'a> {
    config: &'a Config,
    verbose: bool,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator over project configuration.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    /// Enable verbose subprocess output.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the pipeline once and delegate the final compile/link to `host`.
    ///
    /// # Errors
    ///
    /// Any stage failure aborts the whole build; see [`BuildError`] for the
    /// taxonomy. There is no partial success: either the host is handed a
    /// complete link configuration and builds, or no extension artifact is
    /// produced.
    pub fn run(&self, host: &mut dyn ExtensionHost) -> Result<BuildReport, BuildError> {
        match BuildMode::from_config(self.config) {
            BuildMode::System => self.run_system(host),
            BuildMode::Bundled => self.run_bundled(host),
        }
    }

    /// System-library mode: one link flag, nothing else.
    fn run_system(&self, host: &mut dyn ExtensionHost) -> Result<BuildReport, BuildError> {
        let flag = self.config.system_link_flag();
        crate::debug!("system-library mode, linking {flag}");

        // TODO: probe pkg-config to learn whether the system copy was built
        // against bzip2 and needs -lbz2 alongside it.
        host.add_link_flag(&flag);
        host.build_extension()?;

        Ok(BuildReport {
            mode: BuildMode::System,
            staged: 0,
            configure: None,
            features: BTreeSet::new(),
            stale_removed: 0,
            archives: Vec::new(),
        })
    }

    /// Bundled mode: the full stage/configure/probe/build/link pipeline.
    fn run_bundled(&self, host: &mut dyn ExtensionHost) -> Result<BuildReport, BuildError> {
        let library = &self.config.library.name;
        let version = &self.config.library.version;

        let toolchain = Toolchain::resolve(&self.config.toolchain)?;

        let source = self.config.source_dir();
        stage::unpack_vendored_tarball(&source)?;

        let staged = self.config.staged_dir();
        let staged_count = stage::mirror(&source, &staged)?;

        let configure_outcome = configure::run(
            &staged,
            &toolchain,
            &self.config.library.configure_args,
            library,
            version,
            self.verbose,
        )?;

        let detected = features::probe(
            &configure::artifact_path(&staged),
            &self.config.library.probe,
        )?;

        // Features configure detected become extra link dependencies.
        for probe in &self.config.library.probe {
            if detected.contains(&probe.feature)
                && let Some(lib) = &probe.link
            {
                host.add_library(lib);
            }
        }

        compile::run_native_build(&staged, &toolchain.make, library, version, self.verbose)?;

        let plan = link::plan(&staged, &self.config.stale_pattern(), library, version)?;

        host.add_include_dir(&staged);
        host.set_link_objects(plan.archives.clone());
        host.build_extension()?;

        Ok(BuildReport {
            mode: BuildMode::Bundled,
            staged: staged_count,
            configure: Some(configure_outcome),
            features: detected,
            stale_removed: plan.stale_removed,
            archives: plan.archives,
        })
    }
}
