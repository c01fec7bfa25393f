//! Shim identity and capability data.
//!
//! Capabilities are immutable facts about a constructed shim, decided once
//! against the host it was built for.

use std::fmt;

use crate::compat::error::ShimError;
use crate::core::predicate::VersionPredicate;
use crate::host::{HostFeature, HostRuntime};

/// Shim identity information.
#[derive(Debug, Clone)]
pub struct ShimIdentity {
    /// Registry name (e.g. `v1_21_4`)
    pub name: &'static str,

    /// Shim implementation version (for compatibility tracking)
    pub shim_version: semver::Version,

    /// Host versions the shim was written for
    pub targets: VersionPredicate,
}

/// How the host stores custom model data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDataFormat {
    /// A single integer tag
    Integer,
    /// A compound with float/flag/string/colour lists
    Component,
}

impl fmt::Display for ModelDataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelDataFormat::Integer => write!(f, "integer"),
            ModelDataFormat::Component => write!(f, "component"),
        }
    }
}

/// What a constructed shim can do on its host.
#[derive(Debug, Clone)]
pub struct ShimCapabilities {
    /// Text shadow colours survive rendering
    pub text_shadow: bool,

    /// Raw shape of custom model data
    pub model_data: ModelDataFormat,

    /// Host features checked at construction
    pub required_features: Vec<HostFeature>,
}

/// Fail with the first feature in `required` the host does not expose.
pub fn require_features(host: &dyn HostRuntime, required: &[HostFeature]) -> Result<(), ShimError> {
    match required.iter().find(|f| !host.supports(**f)) {
        Some(&feature) => Err(ShimError::MissingFeature { feature }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn test_require_features() {
        let host = MemoryHost::new("1.21.1");
        assert!(require_features(&host, &[HostFeature::DataComponents]).is_ok());
        assert_eq!(
            require_features(
                &host,
                &[HostFeature::DataComponents, HostFeature::ComponentModelData]
            ),
            Err(ShimError::MissingFeature {
                feature: HostFeature::ComponentModelData
            })
        );
        assert!(require_features(&host, &[]).is_ok());
    }
}
