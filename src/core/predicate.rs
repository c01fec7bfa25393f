//! Version-match predicates used to select shims.

use std::fmt;
use std::str::FromStr;

use semver::{Comparator, Op, Prerelease, VersionReq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::version::{HostVersion, VersionParseError};

/// Characters that mark a predicate string as a semver requirement rather
/// than a single exact version.
const REQUIREMENT_MARKERS: &[char] = &['<', '>', '=', '^', '~', '*', ','];

/// Error returned when parsing a predicate string.
#[derive(Debug, Clone, Error)]
pub enum PredicateParseError {
    #[error("invalid exact version predicate: {0}")]
    Version(#[from] VersionParseError),

    #[error("invalid version requirement `{input}`: {message}")]
    Requirement { input: String, message: String },
}

/// Decides whether a shim applies to a given host version.
///
/// A bare version (`1.21.1`) is an exact match. Unlike Cargo requirements
/// it does NOT imply a caret range, so `1.21.1` never matches `1.21.4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPredicate {
    /// Matches exactly one host version.
    Exact(HostVersion),
    /// Matches every version satisfying a semver requirement.
    Range(VersionReq),
    /// Matches every version.
    Any,
}

impl VersionPredicate {
    /// Parse a predicate string (`1.21.1`, `>=1.21.0, <1.21.4`, `*`).
    pub fn parse(input: &str) -> Result<Self, PredicateParseError> {
        let trimmed = input.trim();

        if trimmed == "*" {
            return Ok(VersionPredicate::Any);
        }

        if trimmed.contains(REQUIREMENT_MARKERS) {
            let req = VersionReq::parse(trimmed).map_err(|e| PredicateParseError::Requirement {
                input: trimmed.to_string(),
                message: e.to_string(),
            })?;
            return Ok(VersionPredicate::Range(req));
        }

        Ok(VersionPredicate::Exact(HostVersion::parse(trimmed)?))
    }

    /// Half-open range `>=lower, <upper`.
    pub fn between(lower: &HostVersion, upper: &HostVersion) -> Self {
        let bound = |op, v: &HostVersion| Comparator {
            op,
            major: v.major(),
            minor: Some(v.minor()),
            patch: Some(v.patch()),
            pre: Prerelease::EMPTY,
        };
        VersionPredicate::Range(VersionReq {
            comparators: vec![bound(Op::GreaterEq, lower), bound(Op::Less, upper)],
        })
    }

    /// Check whether the predicate accepts `version`.
    pub fn matches(&self, version: &HostVersion) -> bool {
        match self {
            VersionPredicate::Exact(expected) => expected == version,
            VersionPredicate::Range(req) => req.matches(version.as_semver()),
            VersionPredicate::Any => true,
        }
    }
}

impl FromStr for VersionPredicate {
    type Err = PredicateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionPredicate::parse(s)
    }
}

impl fmt::Display for VersionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPredicate::Exact(v) => write!(f, "{}", v),
            VersionPredicate::Range(req) => write!(f, "{}", req),
            VersionPredicate::Any => write!(f, "*"),
        }
    }
}

impl Serialize for VersionPredicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionPredicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        VersionPredicate::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> HostVersion {
        HostVersion::parse(s).unwrap()
    }

    #[test]
    fn test_bare_version_is_exact() {
        let p = VersionPredicate::parse("1.21.1").unwrap();
        assert_eq!(p, VersionPredicate::Exact(v("1.21.1")));
        assert!(p.matches(&v("1.21.1")));
        assert!(!p.matches(&v("1.21.4")));
        assert!(!p.matches(&v("1.21.0")));
    }

    #[test]
    fn test_range_predicate() {
        let p = VersionPredicate::parse(">=1.21.0, <1.21.4").unwrap();
        assert!(p.matches(&v("1.21.0")));
        assert!(p.matches(&v("1.21.3")));
        assert!(!p.matches(&v("1.21.4")));
        assert!(!p.matches(&v("1.20.6")));
    }

    #[test]
    fn test_between_matches_parsed_range() {
        let built = VersionPredicate::between(&v("1.21.4"), &v("1.22.0"));
        assert_eq!(built, VersionPredicate::parse(">=1.21.4, <1.22.0").unwrap());
        assert_eq!(built.to_string(), ">=1.21.4, <1.22.0");
    }

    #[test]
    fn test_any_predicate() {
        let p = VersionPredicate::parse(" * ").unwrap();
        assert_eq!(p, VersionPredicate::Any);
        assert!(p.matches(&v("0.1.0")));
        assert_eq!(p.to_string(), "*");
    }

    #[test]
    fn test_invalid_predicates() {
        assert!(matches!(
            VersionPredicate::parse(">=banana"),
            Err(PredicateParseError::Requirement { .. })
        ));
        assert!(matches!(
            VersionPredicate::parse("banana"),
            Err(PredicateParseError::Version(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for src in ["1.21.1", ">=1.21.4, <1.22.0"] {
            let p = VersionPredicate::parse(src).unwrap();
            let again = VersionPredicate::parse(&p.to_string()).unwrap();
            assert_eq!(p, again);
        }
    }
}
