//! Host version identifiers.
//!
//! Hosts report their version in several shapes (`1.21.4`,
//! `1.21.4-R0.1-SNAPSHOT`, `git-Paper-196 (MC: 1.21.4)`). `HostVersion`
//! normalizes all of them into a comparable semver triple.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// `(MC: 1.21.4)` marker emitted by server forks in their long version string.
static MC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(MC:\s*([0-9]+(?:\.[0-9]+){1,2})\)").unwrap());

/// Leading `major.minor[.patch]` followed by the end of input or a build suffix.
static LEADING_TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\.([0-9]+)(?:\.([0-9]+))?(?:[-+].*)?$").unwrap());

/// Error returned when a host version string cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("host version string is empty")]
    Empty,

    #[error("`{0}` does not contain a major.minor[.patch] version")]
    Malformed(String),

    #[error("version component `{component}` in `{input}` is out of range")]
    OutOfRange { input: String, component: String },
}

/// Detected version of the running host.
///
/// Immutable once parsed. Ordering follows semver precedence on the
/// normalized triple; build suffixes are not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostVersion {
    inner: semver::Version,
}

impl HostVersion {
    /// Create a version from its components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        HostVersion {
            inner: semver::Version::new(major, minor, patch),
        }
    }

    /// Parse a host-reported version string.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        // A fork's long version string carries the game version in a marker.
        let candidate = match MC_MARKER.captures(trimmed) {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(trimmed),
            None => trimmed,
        };

        let caps = LEADING_TRIPLE
            .captures(candidate)
            .ok_or_else(|| VersionParseError::Malformed(trimmed.to_string()))?;

        let component = |idx: usize| -> Result<u64, VersionParseError> {
            match caps.get(idx) {
                None => Ok(0),
                Some(m) => m.as_str().parse().map_err(|_| VersionParseError::OutOfRange {
                    input: trimmed.to_string(),
                    component: m.as_str().to_string(),
                }),
            }
        };

        Ok(HostVersion::new(component(1)?, component(2)?, component(3)?))
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// Borrow the normalized semver form.
    pub fn as_semver(&self) -> &semver::Version {
        &self.inner
    }
}

impl From<semver::Version> for HostVersion {
    fn from(v: semver::Version) -> Self {
        HostVersion::new(v.major, v.minor, v.patch)
    }
}

impl FromStr for HostVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostVersion::parse(s)
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Serialize for HostVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HostVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HostVersion::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_triple() {
        let v = HostVersion::parse("1.21.4").unwrap();
        assert_eq!(v, HostVersion::new(1, 21, 4));
        assert_eq!(v.to_string(), "1.21.4");
    }

    #[test]
    fn test_parse_two_components_defaults_patch() {
        assert_eq!(HostVersion::parse("1.21").unwrap(), HostVersion::new(1, 21, 0));
    }

    #[test]
    fn test_parse_bukkit_style_suffix() {
        let v = HostVersion::parse(" 1.21.1-R0.1-SNAPSHOT ").unwrap();
        assert_eq!(v, HostVersion::new(1, 21, 1));
    }

    #[test]
    fn test_parse_fork_marker() {
        let v = HostVersion::parse("git-Paper-196 (MC: 1.21.4)").unwrap();
        assert_eq!(v, HostVersion::new(1, 21, 4));

        let v = HostVersion::parse("git-Paper-12 (MC: 1.21)").unwrap();
        assert_eq!(v, HostVersion::new(1, 21, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(HostVersion::parse("   "), Err(VersionParseError::Empty));
        assert!(matches!(
            HostVersion::parse("latest"),
            Err(VersionParseError::Malformed(_))
        ));
        assert!(matches!(
            HostVersion::parse("1"),
            Err(VersionParseError::Malformed(_))
        ));
        assert!(matches!(
            HostVersion::parse("1.21.4.7"),
            Err(VersionParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_out_of_range_component() {
        let err = HostVersion::parse("1.99999999999999999999999.0").unwrap_err();
        assert!(matches!(err, VersionParseError::OutOfRange { .. }));
    }

    #[test]
    fn test_ordering() {
        let a = HostVersion::parse("1.21.1").unwrap();
        let b = HostVersion::parse("1.21.4-R0.1-SNAPSHOT").unwrap();
        let c = HostVersion::parse("1.20.6").unwrap();
        assert!(c < a);
        assert!(a < b);
    }

    #[test]
    fn test_serde_string_form() {
        let v = HostVersion::new(1, 21, 4);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"1.21.4\"");
        let back: HostVersion = serde_json::from_str("\"1.21.4-R0.1-SNAPSHOT\"").unwrap();
        assert_eq!(back, v);
    }
}
