//! Lith command-line interface
//!
//! Build orchestrator for vendored native libraries behind extension modules

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::process;

/// Display an error with its full chain of causes
fn display_error(err: &anyhow::Error) {
    eprintln!("error: {err}");

    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }
}

#[derive(Parser)]
#[command(name = "lith")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build a vendored native library into an extension module", long_about = None)]
pub(crate) struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vendored library and link the extension module
    Build {
        /// Path to lith.toml (defaults to ./lith.toml)
        #[arg(long)]
        config: Option<String>,

        /// Link against the system-installed library instead of building
        /// the vendored copy
        #[arg(long)]
        use_system_library: bool,

        /// Show subprocess output and a per-stage summary
        #[arg(long, short)]
        verbose: bool,
    },

    /// Remove the staged build directory and linked extension output
    Clean {
        /// Path to lith.toml (defaults to ./lith.toml)
        #[arg(long)]
        config: Option<String>,

        /// Show what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the resolved toolchain and project configuration
    Env,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    lith::init_debug(cli.debug);

    let result = match cli.command {
        Commands::Build {
            config,
            use_system_library,
            verbose,
        } => commands::build::run(config.as_deref(), use_system_library, verbose),
        Commands::Clean { config, dry_run } => commands::clean::run(config.as_deref(), dry_run),
        Commands::Env => {
            commands::env::run();
            Ok(())
        }
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(err) = result {
        display_error(&err);
        process::exit(1);
    }
}

mod commands;
