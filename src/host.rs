//! Extension compile and link
//!
//! [`CcHost`] is the production [`ExtensionHost`]: it compiles the extension
//! module's C sources with the same resolved compiler the vendored build
//! used (`-fPIC`, since the objects end up in a shared object) and links the
//! final `.so`, folding in whatever the orchestrator registered: include
//! directories, static archives as link objects, feature libraries, and raw
//! link flags.

use crate::config::Config;
use crate::driver::ExtensionHost;
use crate::env_vars;
use crate::error::BuildError;
use crate::toolchain::{ToolInvocation, Toolchain};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Extension builder driving the resolved C compiler
#[derive(Debug)]
pub struct CcHost {
    compiler: ToolInvocation,
    extension_name: String,
    sources: Vec<PathBuf>,
    output_dir: PathBuf,
    include_dirs: Vec<PathBuf>,
    libraries: Vec<String>,
    link_flags: Vec<String>,
    link_objects: Vec<PathBuf>,
    verbose: bool,
}

impl CcHost {
    /// Create a host for the configured extension module.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CompilerNotFound`] if no compiler can be
    /// resolved; the host needs one in both build modes.
    pub fn new(config: &Config) -> Result<Self, BuildError> {
        let toolchain = Toolchain::resolve(&config.toolchain)?;

        Ok(Self {
            compiler: toolchain.compiler,
            extension_name: config.extension.name.clone(),
            sources: config.extension.sources.clone(),
            output_dir: config.extension_output_dir(),
            include_dirs: Vec::new(),
            libraries: Vec::new(),
            link_flags: Vec::new(),
            link_objects: Vec::new(),
            verbose: false,
        })
    }

    /// Enable verbose output of compile and link command lines.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Where the linked extension binary lands.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.so", self.extension_name))
    }

    /// Compile one C source to an object file under `<output>/obj/`.
    fn compile_object(&self, source: &Path) -> Result<PathBuf, BuildError> {
        let stem = source
            .file_stem()
            .map_or_else(|| "source".to_string(), |s| s.to_string_lossy().into_owned());
        let object = self.output_dir.join("obj").join(format!("{stem}.o"));

        let mut cmd = Command::new(&self.compiler.program);
        cmd.args(&self.compiler.args).arg("-fPIC");
        for dir in &self.include_dirs {
            cmd.arg("-I").arg(dir);
        }
        cmd.arg("-c").arg(source).arg("-o").arg(&object);

        self.run_tool(cmd)?;
        Ok(object)
    }

    /// Run a compiler invocation, treating any nonzero exit as fatal.
    fn run_tool(&self, mut cmd: Command) -> Result<(), BuildError> {
        if self.verbose {
            println!("  {cmd:?}");
        }

        let output = cmd.output().map_err(|e| BuildError::Spawn {
            tool: self.compiler.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            let mut reason = format!("{} exited with {}", self.compiler.program, output.status);
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                reason.push('\n');
                reason.push_str(stderr.trim());
            }
            return Err(BuildError::Extension { reason });
        }

        Ok(())
    }
}

impl ExtensionHost for CcHost {
    fn add_include_dir(&mut self, dir: &Path) {
        self.include_dirs.push(dir.to_path_buf());
    }

    fn add_library(&mut self, library: &str) {
        self.libraries.push(library.to_string());
    }

    fn add_link_flag(&mut self, flag: &str) {
        self.link_flags.push(flag.to_string());
    }

    fn set_link_objects(&mut self, objects: Vec<PathBuf>) {
        self.link_objects = objects;
    }

    fn build_extension(&mut self) -> Result<(), BuildError> {
        fs::create_dir_all(self.output_dir.join("obj")).map_err(|e| BuildError::Extension {
            reason: format!(
                "could not create output directory {}: {e}",
                self.output_dir.join("obj").display()
            ),
        })?;

        let mut objects = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            objects.push(self.compile_object(source)?);
        }

        let output = self.output_path();
        crate::debug!("linking {}", output.display());

        let mut cmd = Command::new(&self.compiler.program);
        cmd.args(&self.compiler.args)
            .arg("-shared")
            .arg("-o")
            .arg(&output)
            .args(&objects)
            // Static archives of relocatable objects are linked in whole,
            // exactly as the orchestrator discovered them.
            .args(&self.link_objects);

        for library in &self.libraries {
            cmd.arg(format!("-l{library}"));
        }
        cmd.args(&self.link_flags);
        if let Some(ldflags) = env_vars::ldflags() {
            cmd.args(ldflags.split_whitespace());
        }

        self.run_tool(cmd)
    }
}
