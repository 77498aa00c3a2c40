//! Toolchain resolution
//!
//! Extracts the compiler, archiver, and archive-indexer invocations the host
//! build environment is already using, so the vendored library is built with
//! the exact same tools as the extension module itself. Each invocation is
//! split into a program token and flag tokens; the result is immutable and
//! resolved once per build invocation.

use crate::env_vars;
use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

/// A single tool invocation: program plus accumulated flag tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Program token (e.g., "gcc")
    pub program: String,
    /// Flag tokens (e.g., `["-pthread", "-O2"]`)
    pub args: Vec<String>,
}

impl ToolInvocation {
    /// Create an invocation from explicit tokens.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse an invocation string on whitespace (`"gcc -pthread"`).
    ///
    /// Returns `None` for empty or all-whitespace input. Host environments
    /// hand these over as single strings; flags never contain embedded
    /// whitespace in practice, so token splitting is the documented contract.
    #[must_use]
    pub fn parse(invocation: &str) -> Option<Self> {
        let mut tokens = invocation.split_whitespace().map(str::to_string);
        let program = tokens.next()?;

        Some(Self {
            program,
            args: tokens.collect(),
        })
    }

    /// Render the invocation back to a single command line.
    ///
    /// Used for `ARCHIVE=`/`RANLIB=` assignments handed to configure and for
    /// display in `lith env`.
    #[must_use]
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Optional `[toolchain]` overrides from `lith.toml`
///
/// Overrides take priority over the environment. Each value is a full
/// invocation string, parsed the same way as its environment counterpart.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainOverrides {
    /// C compiler invocation (overrides `CC`)
    pub cc: Option<String>,
    /// Extra compiler flags (overrides `CFLAGS`)
    pub cflags: Option<String>,
    /// Archiver invocation (overrides `AR`)
    pub ar: Option<String>,
    /// Extra archiver flags (overrides `ARFLAGS`)
    pub arflags: Option<String>,
    /// Archive indexer invocation (overrides `RANLIB`)
    pub ranlib: Option<String>,
    /// Native build tool invocation (overrides `MAKE`)
    pub make: Option<String>,
}

/// The resolved toolchain propagated to the vendored build
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Compiler program + flags (always present; the build cannot proceed
    /// without one)
    pub compiler: ToolInvocation,
    /// Archiver, if the host environment names one
    pub archiver: Option<ToolInvocation>,
    /// Archive indexer, if the host environment names one
    pub ranlib: Option<ToolInvocation>,
    /// Native build tool (defaults to `make`)
    pub make: ToolInvocation,
}

impl Toolchain {
    /// Resolve the toolchain from config overrides and the environment.
    ///
    /// Compiler resolution order: `[toolchain] cc` -> `CC` -> `cc` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CompilerNotFound`] if no compiler invocation can
    /// be resolved; every other tool is optional or has a default.
    pub fn resolve(overrides: &ToolchainOverrides) -> Result<Self, BuildError> {
        Self::resolve_from(
            overrides.cc.clone().or_else(env_vars::cc),
            overrides.cflags.clone().or_else(env_vars::cflags),
            overrides.ar.clone().or_else(env_vars::ar),
            overrides.arflags.clone().or_else(env_vars::arflags),
            overrides.ranlib.clone().or_else(env_vars::ranlib),
            overrides.make.clone().or_else(env_vars::make_command),
        )
    }

    /// Resolve from explicit values (environment already applied).
    fn resolve_from(
        cc: Option<String>,
        cflags: Option<String>,
        ar: Option<String>,
        arflags: Option<String>,
        ranlib: Option<String>,
        make: Option<String>,
    ) -> Result<Self, BuildError> {
        let mut compiler = match cc.as_deref().and_then(ToolInvocation::parse) {
            Some(invocation) => invocation,
            None => find_cc_on_path().ok_or(BuildError::CompilerNotFound)?,
        };

        if let Some(flags) = cflags {
            compiler.args.extend(flags.split_whitespace().map(str::to_string));
        }

        let mut archiver = ar.as_deref().and_then(ToolInvocation::parse);
        if let (Some(archiver), Some(flags)) = (archiver.as_mut(), arflags) {
            archiver.args.extend(flags.split_whitespace().map(str::to_string));
        }

        let ranlib = ranlib.as_deref().and_then(ToolInvocation::parse);

        let make = make
            .as_deref()
            .and_then(ToolInvocation::parse)
            .unwrap_or_else(|| ToolInvocation::new("make", Vec::new()));

        Ok(Self {
            compiler,
            archiver,
            ranlib,
            make,
        })
    }
}

/// Find `cc` on `PATH` as the last-resort compiler.
fn find_cc_on_path() -> Option<ToolInvocation> {
    let output = Command::new("which").arg("cc").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let path = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    if path.exists() {
        Some(ToolInvocation::new(path.to_string_lossy(), Vec::new()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_program_and_flags() {
        let invocation = ToolInvocation::parse("gcc -pthread -O2").unwrap();

        assert_eq!(invocation.program, "gcc");
        assert_eq!(invocation.args, vec!["-pthread", "-O2"]);
    }

    #[test]
    fn parse_bare_program() {
        let invocation = ToolInvocation::parse("ar").unwrap();

        assert_eq!(invocation.program, "ar");
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(ToolInvocation::parse("").is_none());
        assert!(ToolInvocation::parse("   ").is_none());
    }

    #[test]
    fn command_line_round_trips() {
        let invocation = ToolInvocation::parse("ar rcs").unwrap();
        assert_eq!(invocation.command_line(), "ar rcs");

        let bare = ToolInvocation::parse("ranlib").unwrap();
        assert_eq!(bare.command_line(), "ranlib");
    }

    #[test]
    fn resolve_appends_cflags_to_compiler() {
        let toolchain = Toolchain::resolve_from(
            Some("gcc -pthread".to_string()),
            Some("-O2 -fPIC".to_string()),
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert_eq!(toolchain.compiler.program, "gcc");
        assert_eq!(toolchain.compiler.args, vec!["-pthread", "-O2", "-fPIC"]);
    }

    #[test]
    fn resolve_keeps_archiver_and_ranlib_optional() {
        let toolchain = Toolchain::resolve_from(
            Some("cc".to_string()),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert!(toolchain.archiver.is_none());
        assert!(toolchain.ranlib.is_none());
    }

    #[test]
    fn resolve_merges_arflags_into_archiver() {
        let toolchain = Toolchain::resolve_from(
            Some("cc".to_string()),
            None,
            Some("ar".to_string()),
            Some("rcs".to_string()),
            None,
            None,
        )
        .unwrap();

        let archiver = toolchain.archiver.unwrap();
        assert_eq!(archiver.command_line(), "ar rcs");
    }

    #[test]
    fn resolve_defaults_make() {
        let toolchain =
            Toolchain::resolve_from(Some("cc".to_string()), None, None, None, None, None).unwrap();

        assert_eq!(toolchain.make.program, "make");
    }

    #[test]
    fn resolve_honors_make_override() {
        let toolchain = Toolchain::resolve_from(
            Some("cc".to_string()),
            None,
            None,
            None,
            None,
            Some("gmake -j4".to_string()),
        )
        .unwrap();

        assert_eq!(toolchain.make.program, "gmake");
        assert_eq!(toolchain.make.args, vec!["-j4"]);
    }

    #[test]
    fn overrides_table_deserializes_from_toml() {
        let overrides: ToolchainOverrides = toml::from_str(
            r#"
            cc = "clang"
            cflags = "-O2"
            ranlib = "ranlib"
            "#,
        )
        .unwrap();

        assert_eq!(overrides.cc.as_deref(), Some("clang"));
        assert_eq!(overrides.cflags.as_deref(), Some("-O2"));
        assert_eq!(overrides.ar, None);
    }
}
