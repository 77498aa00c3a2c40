//! Build command
//!
//! Runs the whole pipeline for one invocation: vendored library first (or
//! the system-library bypass), then the extension module compile and link.

use anyhow::Result;
use lith::{BuildMode, CcHost, Config, ConfigureOutcome, Orchestrator};
use std::path::Path;

/// Build the vendored library and the extension module.
pub(crate) fn run(
    config_path: Option<&str>,
    use_system_library: bool,
    verbose: bool,
) -> Result<()> {
    let mut config = Config::load(config_path.map(Path::new))?;

    // The CLI switch wins over the file, like the environment does.
    if use_system_library {
        config.build.use_system_library = true;
    }

    let mut host = CcHost::new(&config)?.verbose(verbose);
    let output = host.output_path();

    let report = Orchestrator::new(&config).verbose(verbose).run(&mut host)?;

    match report.mode {
        BuildMode::System => {
            println!(
                "Linked {} against the system {}",
                config.extension.name, config.library.name
            );
        }
        BuildMode::Bundled => {
            println!(
                "Built {} {} ({} archive{})",
                config.library.name,
                config.library.version,
                report.archives.len(),
                if report.archives.len() == 1 { "" } else { "s" }
            );

            if verbose {
                println!("  staged {} file(s)", report.staged);
                match report.configure {
                    Some(ConfigureOutcome::Configured) => println!("  ran configure"),
                    Some(ConfigureOutcome::SkippedExisting) => {
                        println!("  configure already done, skipped");
                    }
                    None => {}
                }
                for feature in &report.features {
                    println!("  feature: {feature}");
                }
                if report.stale_removed > 0 {
                    println!("  removed {} stale extension binaries", report.stale_removed);
                }
            }
        }
    }

    println!("Extension written to {}", output.display());
    Ok(())
}
