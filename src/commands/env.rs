//! Env command
//!
//! Displays the resolved toolchain and project configuration, useful for
//! diagnosing why a vendored build picked up the wrong compiler.

use lith::{Config, Toolchain, ToolchainOverrides};

/// Display environment information
pub(crate) fn run() {
    println!("## Environment");
    println!();
    println!("Lith       {}", env!("CARGO_PKG_VERSION"));
    println!();

    // Project config is optional here: `lith env` should work anywhere.
    let config = Config::load(None).ok();
    let overrides = config
        .as_ref()
        .map(|c| c.toolchain.clone())
        .unwrap_or_else(ToolchainOverrides::default);

    match Toolchain::resolve(&overrides) {
        Ok(toolchain) => {
            println!("CC         {}", toolchain.compiler.command_line());
            println!(
                "ARCHIVE    {}",
                toolchain
                    .archiver
                    .as_ref()
                    .map_or_else(|| "(not set)".to_string(), |a| a.command_line())
            );
            println!(
                "RANLIB     {}",
                toolchain
                    .ranlib
                    .as_ref()
                    .map_or_else(|| "(not set)".to_string(), |r| r.command_line())
            );
            println!("MAKE       {}", toolchain.make.command_line());
        }
        Err(_) => println!("CC         not found"),
    }
    println!();

    if let Some(config) = config {
        let mode = if config.use_system_library() {
            "system"
        } else {
            "bundled"
        };

        println!(
            "Library    {} {}",
            config.library.name, config.library.version
        );
        println!("Mode       {mode}");
        println!("Source     {}", config.source_dir().display());
        println!("Staged     {}", config.staged_dir().display());
    } else {
        println!("No lith.toml in the current directory");
    }
}
