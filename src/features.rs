//! Feature detection from the generated build description
//!
//! Configure records which optional capabilities it detected (for example
//! bzip2 compression support) in the Makefile it generates. The only contract
//! relied on here is that the Makefile is greppable for a marker string; the
//! probe is pure text inspection, recomputed on every invocation.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// One optional-feature probe: marker text mapped to a feature identifier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureProbe {
    /// Feature identifier reported when the marker is present
    pub feature: String,
    /// Marker substring searched for in the build description
    pub marker: String,
    /// Library to link when the feature is active (e.g., `bz2`)
    #[serde(default)]
    pub link: Option<String>,
}

impl FeatureProbe {
    /// The bzip2 probe every vendored build carries by default: configure
    /// emits `-DHAVE_BZIP2=1` when it finds `bzlib.h`, and the extension must
    /// then link `libbz2`.
    #[must_use]
    pub fn bzip2() -> Self {
        Self {
            feature: "bzip2".to_string(),
            marker: "-DHAVE_BZIP2=1".to_string(),
            link: Some("bz2".to_string()),
        }
    }
}

/// Scan the build description for each probe's marker.
///
/// Returns the set of active feature identifiers; same input text always
/// yields the same set.
///
/// # Errors
///
/// Returns [`BuildError::FeatureProbe`] if the build description cannot be
/// read: a staging inconsistency, since configure just claimed to have
/// produced it.
pub fn probe(
    build_description: &Path,
    probes: &[FeatureProbe],
) -> Result<BTreeSet<String>, BuildError> {
    let text = fs::read_to_string(build_description).map_err(|e| BuildError::FeatureProbe {
        path: build_description.to_path_buf(),
        source: e,
    })?;

    let features = probes
        .iter()
        .filter(|p| text.contains(&p.marker))
        .map(|p| p.feature.clone())
        .collect();

    Ok(features)
}
