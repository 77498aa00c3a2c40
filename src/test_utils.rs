//! Shared test utilities for lith tests
//!
//! Fixtures for exercising the pipeline without a real compiler: fake
//! vendored library trees whose configure and build steps are small shell
//! scripts, and a recording [`ExtensionHost`] that captures what the
//! orchestrator hands to the extension linker.

use crate::config::Config;
use crate::driver::ExtensionHost;
use crate::error::BuildError;
use std::fs;
use std::path::{Path, PathBuf};

/// `ExtensionHost` that records every call instead of compiling anything
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub include_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub link_flags: Vec<String>,
    pub link_objects: Vec<PathBuf>,
    /// How many times `build_extension` ran
    pub builds: usize,
}

impl ExtensionHost for RecordingHost {
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
        self.builds += 1;
        Ok(())
    }
}

/// Project configuration rooted in a temporary directory.
///
/// Library "demo 1.0" with absolute paths under `root`, a toolchain that
/// never invokes a real compiler, and `sh ./build-lib.sh` standing in for
/// the vendored build tool (the script is part of the vendored tree, so it
/// is staged like any other source file).
pub fn project_config(root: &Path) -> Config {
    let mut config = Config::default();

    config.library.name = "demo".to_string();
    config.library.version = "1.0".to_string();
    config.library.source_dir = Some(root.join("vendor/demo-1.0"));
    config.build.dir = root.join("build");
    config.extension.name = "demo_wrap".to_string();
    config.extension.sources = vec![root.join("ext/demo_wrap.c")];
    config.toolchain.cc = Some("cc -testing".to_string());
    config.toolchain.make = Some("sh ./build-lib.sh".to_string());

    config
}

/// Write a fake vendored library source tree at `dir`.
///
/// The configure script records its arguments to `configure-args.txt` and
/// generates a Makefile (with the bzip2 marker if `with_bzip2`); the build
/// script creates the named archive files.
pub fn fake_vendored_library(dir: &Path, with_bzip2: bool, archives: &[&str]) {
    fs::create_dir_all(dir).expect("create vendored tree");

    let marker = if with_bzip2 { " -DHAVE_BZIP2=1" } else { "" };
    let configure = format!(
        "#!/bin/sh\n\
         printf '%s\\n' \"$@\" > configure-args.txt\n\
         cat > Makefile <<'EOF'\n\
         CFLAGS = -O2{marker}\n\
         EOF\n"
    );
    fs::write(dir.join("configure"), configure).expect("write configure");

    let mut build = String::from("#!/bin/sh\n");
    for archive in archives {
        if let Some(parent) = Path::new(archive).parent()
            && parent != Path::new("")
        {
            build.push_str(&format!("mkdir -p '{}'\n", parent.display()));
        }
        build.push_str(&format!("printf 'ar' > '{archive}'\n"));
    }
    fs::write(dir.join("build-lib.sh"), build).expect("write build script");

    // A header and a nested vendored dependency, so staging has a tree to
    // mirror rather than two flat files.
    fs::write(dir.join("demo.h"), "#define DEMO_VERSION \"1.0\"\n").expect("write header");
    fs::create_dir_all(dir.join("zlib")).expect("create nested dep");
    fs::write(dir.join("zlib/zlib.h"), "#define ZLIB_VERSION \"1.3\"\n")
        .expect("write nested header");
}
