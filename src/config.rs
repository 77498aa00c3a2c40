//! Project configuration
//!
//! `lith` is driven by a `lith.toml` at the project root describing the
//! vendored library, the extension module it backs, and optional toolchain
//! overrides. Everything beyond the library and extension identity has a
//! default, so a minimal file is four lines.
//!
//! ```toml
//! [library]
//! name = "cfitsio"
//! version = "4.4.0"
//!
//! [extension]
//! name = "fitsio_wrap"
//! sources = ["ext/fitsio_wrap.c"]
//! ```

use crate::features::FeatureProbe;
use crate::toolchain::ToolchainOverrides;
use crate::{env_vars, paths};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE: &str = "lith.toml";

/// Top-level project configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// The vendored library to build and link
    pub library: LibraryConfig,
    /// Build-tree and mode settings
    pub build: BuildConfig,
    /// The extension module this build ultimately produces
    pub extension: ExtensionConfig,
    /// Toolchain overrides (priority over the environment)
    pub toolchain: ToolchainOverrides,
}

/// `[library]`: identity and configure behavior of the vendored library
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LibraryConfig {
    /// Library name (e.g., "cfitsio")
    pub name: String,
    /// Vendored version string, used in paths and error messages
    pub version: String,
    /// Source tree location; defaults to `vendor/<name>-<version>`
    pub source_dir: Option<PathBuf>,
    /// Arguments for the vendored configure script
    pub configure_args: Vec<String>,
    /// Optional-feature probes run against the generated Makefile
    pub probe: Vec<FeatureProbe>,
    /// Link flag for system-library mode; defaults to `-l<name>`
    pub system_link: Option<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            source_dir: None,
            configure_args: vec!["--with-bzip2".to_string()],
            probe: vec![FeatureProbe::bzip2()],
            system_link: None,
        }
    }
}

/// `[build]`: build-tree location and mode switches
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Build root; staged source lives at `<dir>/<name>-<version>`
    pub dir: PathBuf,
    /// Link against a system-installed copy instead of building the
    /// vendored one
    pub use_system_library: bool,
    /// Override for the stale-binary invalidation glob
    pub stale_pattern: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("build"),
            use_system_library: false,
            stale_pattern: None,
        }
    }
}

/// `[extension]`: the extension module handed to the host compiler
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtensionConfig {
    /// Extension module name (the linked binary is `<name>.so`)
    pub name: String,
    /// C source files of the extension module
    pub sources: Vec<PathBuf>,
    /// Where the linked binary lands; defaults to `<build.dir>/ext`
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or `lith.toml` in the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, fails to parse, or omits the
    /// library/extension identity.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {} (run lith at the project root)", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the fields without usable defaults are present.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.library.name.is_empty(), "library.name is required");
        anyhow::ensure!(
            !self.library.version.is_empty(),
            "library.version is required"
        );
        anyhow::ensure!(!self.extension.name.is_empty(), "extension.name is required");
        anyhow::ensure!(
            !self.extension.sources.is_empty(),
            "extension.sources must list at least one C source file"
        );
        Ok(())
    }

    /// Whether this invocation links the system library instead of building
    /// the vendored one. The `LITH_USE_SYSTEM_LIB` environment variable
    /// forces system mode without editing the file.
    #[must_use]
    pub fn use_system_library(&self) -> bool {
        self.build.use_system_library || env_vars::use_system_library()
    }

    /// Vendored source tree location.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.library.source_dir.clone().unwrap_or_else(|| {
            paths::vendored_source_dir(&self.library.name, &self.library.version)
        })
    }

    /// Staged build directory for the vendored library.
    #[must_use]
    pub fn staged_dir(&self) -> PathBuf {
        paths::staged_dir(&self.build.dir, &self.library.name, &self.library.version)
    }

    /// Output directory for the linked extension binary.
    #[must_use]
    pub fn extension_output_dir(&self) -> PathBuf {
        self.extension
            .output_dir
            .clone()
            .unwrap_or_else(|| paths::extension_output_dir(&self.build.dir))
    }

    /// Glob matching previously linked extension binaries to invalidate.
    #[must_use]
    pub fn stale_pattern(&self) -> String {
        self.build.stale_pattern.clone().unwrap_or_else(|| {
            paths::default_stale_pattern(&self.extension_output_dir(), &self.extension.name)
        })
    }

    /// Link flag applied in system-library mode.
    #[must_use]
    pub fn system_link_flag(&self) -> String {
        self.library
            .system_link
            .clone()
            .unwrap_or_else(|| format!("-l{}", self.library.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        toml::from_str(
            r#"
            [library]
            name = "cfitsio"
            version = "4.4.0"

            [extension]
            name = "fitsio_wrap"
            sources = ["ext/fitsio_wrap.c"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn minimal_config_gets_full_defaults() {
        let config = minimal();
        config.validate().unwrap();

        assert_eq!(config.source_dir(), Path::new("vendor/cfitsio-4.4.0"));
        assert_eq!(config.staged_dir(), Path::new("build/cfitsio-4.4.0"));
        assert_eq!(config.library.configure_args, vec!["--with-bzip2"]);
        assert_eq!(config.library.probe.len(), 1);
        assert_eq!(config.system_link_flag(), "-lcfitsio");
        assert_eq!(config.stale_pattern(), "build/ext/fitsio_wrap*.so*");
        assert!(!config.build.use_system_library);
    }

    #[test]
    fn overrides_replace_defaults() {
        let config: Config = toml::from_str(
            r#"
            [library]
            name = "cfitsio"
            version = "4.4.0"
            source-dir = "third_party/cfitsio"
            configure-args = []
            system-link = "-lcfitsio_custom"

            [build]
            dir = "out"
            use-system-library = true
            stale-pattern = "out/**/*.so"

            [extension]
            name = "fitsio_wrap"
            sources = ["ext/a.c", "ext/b.c"]

            [toolchain]
            cc = "clang -fuse-ld=lld"
            "#,
        )
        .unwrap();

        assert_eq!(config.source_dir(), Path::new("third_party/cfitsio"));
        assert_eq!(config.staged_dir(), Path::new("out/cfitsio-4.4.0"));
        assert!(config.library.configure_args.is_empty());
        assert_eq!(config.system_link_flag(), "-lcfitsio_custom");
        assert_eq!(config.stale_pattern(), "out/**/*.so");
        assert!(config.use_system_library());
        assert_eq!(config.toolchain.cc.as_deref(), Some("clang -fuse-ld=lld"));
    }

    #[test]
    fn validation_requires_identity_fields() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn custom_probes_parse() {
        let config: Config = toml::from_str(
            r#"
            [library]
            name = "cfitsio"
            version = "4.4.0"

            [[library.probe]]
            feature = "curl"
            marker = "-DCFITSIO_HAVE_CURL=1"
            link = "curl"

            [extension]
            name = "fitsio_wrap"
            sources = ["ext/fitsio_wrap.c"]
            "#,
        )
        .unwrap();

        assert_eq!(config.library.probe.len(), 1);
        assert_eq!(config.library.probe[0].feature, "curl");
        assert_eq!(config.library.probe[0].link.as_deref(), Some("curl"));
    }
}
