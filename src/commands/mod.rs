//! Command implementations for the lith CLI

pub(crate) mod build;
pub(crate) mod clean;
pub(crate) mod completion;
pub(crate) mod env;
