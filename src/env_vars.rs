//! Toolchain and orchestrator environment variable handling.
//!
//! The host build environment communicates its active toolchain through the
//! conventional variables (`CC`, `CFLAGS`, `AR`, `RANLIB`, `MAKE`). These are
//! consumed once per build invocation by the toolchain resolver and passed
//! verbatim to the vendored configure script.

use std::env;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| {
        let s = s.to_lowercase();
        s == "1" || s == "true" || s == "yes"
    })
}

// Non-empty environment variable, trimmed
fn non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get the C compiler invocation (`CC`, may include flags: `"gcc -pthread"`).
pub fn cc() -> Option<String> {
    non_empty("CC")
}

/// Get extra C compiler flags (`CFLAGS`).
pub fn cflags() -> Option<String> {
    non_empty("CFLAGS")
}

/// Get the archiver invocation (`AR`).
pub fn ar() -> Option<String> {
    non_empty("AR")
}

/// Get extra archiver flags (`ARFLAGS`).
pub fn arflags() -> Option<String> {
    non_empty("ARFLAGS")
}

/// Get the archive indexer invocation (`RANLIB`).
pub fn ranlib() -> Option<String> {
    non_empty("RANLIB")
}

/// Get extra linker flags (`LDFLAGS`), forwarded to the extension link step.
pub fn ldflags() -> Option<String> {
    non_empty("LDFLAGS")
}

/// Get the native build tool invocation (`MAKE`, defaults to `make`).
pub fn make_command() -> Option<String> {
    non_empty("MAKE")
}

/// Check if system-library mode is forced from the environment
/// (`LITH_USE_SYSTEM_LIB`).
pub fn use_system_library() -> bool {
    is_enabled("LITH_USE_SYSTEM_LIB")
}

/// Check if debug logging is enabled from the environment (`LITH_DEBUG`).
pub fn lith_debug() -> bool {
    is_enabled("LITH_DEBUG")
}
