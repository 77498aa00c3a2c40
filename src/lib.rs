//! Lith internal library code
//!
//! Build orchestrator for projects that vendor a third-party C library and
//! statically link it into a dynamically-loaded extension module. The
//! pipeline stages the vendored source, configures and compiles it with the
//! host environment's own toolchain, and hands the resulting static archives
//! to the extension linker, or bypasses all of that and links a
//! system-installed copy.

pub mod compile;
pub mod config;
pub mod configure;
pub mod debug;
pub mod driver;
pub mod env_vars;
pub mod error;
pub mod features;
pub mod host;
pub mod link;
pub mod paths;
pub mod stage;
pub mod toolchain;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export common types for convenience
pub use config::{BuildConfig, Config, ExtensionConfig, LibraryConfig};
pub use configure::ConfigureOutcome;
pub use debug::{debug_log, init_debug, is_debug_enabled};
pub use driver::{BuildMode, BuildReport, ExtensionHost, Orchestrator};
pub use error::BuildError;
pub use features::FeatureProbe;
pub use host::CcHost;
pub use link::LinkPlan;
pub use toolchain::{ToolInvocation, Toolchain, ToolchainOverrides};
